//! Error types for churn-core.

use thiserror::Error;

/// Result type for churn-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating or encoding churn protocol values.
#[derive(Debug, Error)]
pub enum Error {
    /// A quorum token is not a decimal integer.
    #[error("invalid quorum id {token:?}: not a decimal integer")]
    Parse { token: String },

    /// A quorum id is at or above the reserved sentinel.
    #[error("quorum id {value} is out of range (must be below {max})")]
    Range { value: u64, max: u8 },

    /// No quorum ids were supplied.
    #[error("quorum list is empty")]
    EmptyInput,

    /// An expiry cannot be represented as an on-chain unsigned integer.
    #[error("expiry {0} is out of range (must not be negative)")]
    ExpiryOutOfRange(i64),

    /// An operator address is not 20 bytes of hex.
    #[error("invalid operator address: {0}")]
    InvalidAddress(String),

    /// Key material has the wrong shape.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// A signature did not verify against the expected key and payload.
    #[error("signature verification failed")]
    InvalidSignature,

    /// A field has the wrong length or encoding.
    #[error("malformed {field}: {reason}")]
    Malformed { field: &'static str, reason: String },

    /// The keystore file could not be read or understood.
    #[error("failed to load key: {0}")]
    KeyLoad(String),

    /// The keystore ciphertext did not authenticate under the given password.
    #[error("failed to decrypt key: wrong password or corrupted keystore")]
    Decryption,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
