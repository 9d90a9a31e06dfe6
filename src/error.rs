use thiserror::Error;

/// Failures raised by hash sizes, hashers and the hash codes they produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// A construction parameter was outside its domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A hash code was read after its last value.
    #[error("no further hash values available")]
    ExhaustedSequence,

    /// A value was requested in a view too narrow to hold it.
    #[error("hash value {value} does not fit in {bits} bits")]
    ArithmeticOverflow { value: String, bits: u32 },

    /// The operation is not offered by this size or hasher.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

impl HashError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        HashError::InvalidArgument(msg.into())
    }

    pub(crate) fn overflow(value: impl ToString, bits: u32) -> Self {
        HashError::ArithmeticOverflow {
            value: value.to_string(),
            bits,
        }
    }
}
