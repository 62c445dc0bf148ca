//! Error types for the churn client.

use std::time::Duration;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stage of the admission flow an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Keystore,
    Build,
    Transport,
    Authority,
    Validation,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keystore => write!(f, "keystore"),
            Self::Build => write!(f, "build"),
            Self::Transport => write!(f, "transport"),
            Self::Authority => write!(f, "authority"),
            Self::Validation => write!(f, "validation"),
        }
    }
}

/// Errors that abort an admission attempt.
#[derive(Debug, Error)]
pub enum Error {
    /// The operator key could not be loaded or decrypted.
    #[error("cannot load operator key: {0}")]
    Keystore(#[source] churn_core::Error),

    /// Local input was rejected before any network call.
    #[error("invalid request: {0}")]
    Request(#[source] churn_core::Error),

    /// The churner URL cannot be used.
    #[error("invalid churner URL: {0}")]
    InvalidUrl(String),

    /// The authority did not answer in time. No authorization is assumed.
    #[error("authority did not answer within {0:?}")]
    Timeout(Duration),

    /// The authority could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The authority's answer did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The authority refused admission.
    #[error("admission denied by authority: {0}")]
    AdmissionDenied(String),

    /// The authorization failed local validation.
    #[error("invalid authorization: {0}")]
    Validation(#[source] churn_core::Error),

    /// The authorization is already past its expiry.
    #[error("authorization expired at {expiry} (now {now})")]
    Expired { expiry: i64, now: i64 },
}

impl Error {
    /// Which stage failed.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Keystore(_) => Stage::Keystore,
            Error::Request(_) | Error::InvalidUrl(_) => Stage::Build,
            Error::Timeout(_) | Error::Transport(_) | Error::Protocol(_) => Stage::Transport,
            Error::AdmissionDenied(_) => Stage::Authority,
            Error::Validation(_) | Error::Expired { .. } => Stage::Validation,
        }
    }
}
