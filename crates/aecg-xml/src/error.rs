use aecg_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The bytes are not a well-formed annotated ECG document.
    #[error("malformed document: {message}")]
    MalformedDocument { message: String },

    /// A sequence value with an unknown discriminator or missing fields.
    #[error("malformed sequence: {reason}")]
    MalformedSequence { reason: String },

    /// An out-of-vocabulary code or unparsable timestamp on the wire.
    #[error("malformed document: {0}")]
    Model(#[from] ModelError),

    #[error("failed to write XML: {message}")]
    Write { message: String },
}

impl CodecError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    pub(crate) fn sequence(reason: impl Into<String>) -> Self {
        Self::MalformedSequence {
            reason: reason.into(),
        }
    }

    pub(crate) fn write(source: impl std::fmt::Display) -> Self {
        Self::Write {
            message: source.to_string(),
        }
    }

    /// True for every decode failure (document, sequence or vocabulary).
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::Write { .. })
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
