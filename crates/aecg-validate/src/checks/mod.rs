//! Per-node checks, one module per level of the document tree.

pub(crate) mod annotations;
pub(crate) mod document;
pub(crate) mod series;
