//! Error types for the churn authority.

use churn_core::QuorumId;
use thiserror::Error;

/// Result type for authority operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an admission request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenialReason {
    /// The request failed structural validation.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The operator's signature over the request does not verify.
    #[error("operator signature does not verify")]
    BadOperatorSignature,

    /// The authority does not manage this quorum.
    #[error("quorum {0} does not exist")]
    UnknownQuorum(QuorumId),

    /// The ranking service failed.
    #[error("ranking unavailable for quorum {quorum}: {reason}")]
    RankingUnavailable { quorum: QuorumId, reason: String },

    /// The operator is already an incumbent of the quorum.
    #[error("operator is already registered in quorum {0}")]
    AlreadyRegistered(QuorumId),

    /// The operator holds an unexpired authorization for the quorum.
    #[error("operator already holds a pending authorization for quorum {0}")]
    PendingAuthorization(QuorumId),

    /// Every incumbent of a full quorum is already reserved for eviction.
    #[error("quorum {0} is full and has no evictable incumbent")]
    NoEvictableIncumbent(QuorumId),

    /// The operator asked again before its rate-limit interval elapsed.
    #[error("rate limited: retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: i64 },
}

/// Errors that can occur in the churn authority.
#[derive(Debug, Error)]
pub enum Error {
    /// Policy rejection. Terminal for the attempt.
    #[error("admission denied: {0}")]
    AdmissionDenied(#[from] DenialReason),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A quorum lock was poisoned by a panicking holder.
    #[error("quorum state lock poisoned")]
    LockPoisoned,

    /// The blocking task running a request panicked or was cancelled.
    #[error("request handler failed: {0}")]
    Handler(String),

    /// Core type error
    #[error(transparent)]
    Core(#[from] churn_core::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The denial reason, if this is a policy rejection.
    pub fn denial(&self) -> Option<&DenialReason> {
        match self {
            Error::AdmissionDenied(reason) => Some(reason),
            _ => None,
        }
    }
}
