//! Recursive conformance validation of annotated ECG documents.
//!
//! [`validate`] walks the whole document and reports every defect it finds,
//! not just the first. Validation polls a [`CancelSignal`] once per node and
//! returns [`ValidationOutcome::Cancelled`] as soon as it fires.

pub mod cancel;
mod checks;
pub mod defect;
mod engine;

pub use cancel::{CancelSignal, CancellationToken, NeverCancel};
pub use defect::{Defect, DefectKind};
pub use engine::{ValidationOutcome, validate};
