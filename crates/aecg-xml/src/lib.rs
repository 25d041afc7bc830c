//! XML codec for HL7 annotated ECG documents.
//!
//! [`decode`] parses wire bytes into an [`aecg_model::Document`]; [`encode`]
//! writes one back out. Sequence values are a discriminated union selected by
//! `xsi:type` (`GLIST_TS` or `SLIST_PQ`), and no other discriminator is
//! accepted.

pub mod common;
mod decode;
mod element;
mod encode;
pub mod error;
mod sequence;

use aecg_model::Document;
use tracing::{debug, info_span};

pub use common::{EncodeOptions, HL7_NS, ROOT_ELEMENT, XSI_NS, format_decimal, format_digits};
pub use error::{CodecError, Result};

/// Parse an annotated ECG document.
pub fn decode(bytes: &[u8]) -> Result<Document> {
    let span = info_span!("decode", bytes = bytes.len());
    let _guard = span.enter();
    let root = element::parse(bytes)?;
    let document = decode::decode_document(&root)?;
    debug!(series = document.series.len(), "document decoded");
    Ok(document)
}

/// Serialize with two-space indentation.
pub fn encode(document: &Document) -> Result<Vec<u8>> {
    encode_with(document, &EncodeOptions::default())
}

pub fn encode_with(document: &Document, options: &EncodeOptions) -> Result<Vec<u8>> {
    let span = info_span!("encode", series = document.series.len());
    let _guard = span.enter();
    let bytes = encode::encode_document(document, options)?;
    debug!(bytes = bytes.len(), "document encoded");
    Ok(bytes)
}
