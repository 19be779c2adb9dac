#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("digest mismatch: expected {}, got {}", hex::encode(.expected), hex::encode(.actual))]
    Mismatch {
        expected: Vec<u8>,
        actual:   Vec<u8>,
    },

    #[error("invalid hex digest '{input}': {source}")]
    InvalidHex {
        input:  String,
        source: hex::FromHexError,
    },

    #[error("digest has {actual} bytes, expected {expected}")]
    InvalidLength { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, VerificationError>;
