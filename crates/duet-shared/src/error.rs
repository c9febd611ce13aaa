use thiserror::Error;

/// Errors produced when parsing stored credentials.
#[derive(Error, Debug)]
pub enum CredentialsError {
    /// Hex decoding of a stored salt or digest failed.
    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// A stored salt had the wrong length.
    #[error("Invalid salt length: expected {expected}, got {got}")]
    InvalidSaltLength { expected: usize, got: usize },

    /// A stored digest had the wrong length.
    #[error("Invalid digest length: expected {expected}, got {got}")]
    InvalidDigestLength { expected: usize, got: usize },
}
