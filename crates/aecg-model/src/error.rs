use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// A waveform series was requested with a non-positive (or non-finite) sample rate.
    #[error("sample rate must be a positive number of samples per second, got {sample_rate}")]
    InvalidSampleRate { sample_rate: f64 },

    #[error("invalid timestamp '{value}': expected YYYYMMDD, YYYYMMDDHHmmss or YYYYMMDDHHmmss.SSS")]
    InvalidTimestamp { value: String },

    /// A code string that is not a member of the named closed vocabulary.
    #[error("code '{code}' is not part of the {vocabulary} vocabulary")]
    UnknownCode {
        vocabulary: &'static str,
        code: String,
    },

    #[error("unknown code system '{value}'")]
    UnknownCodeSystem { value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
