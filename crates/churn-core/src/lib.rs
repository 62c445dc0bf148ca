//! Churn Core - operator admission types for capacity-bounded quorums
//!
//! When an operator wants to join quorums that are already full, a trusted
//! churn authority decides which incumbent to evict and signs a salted,
//! expiring approval the on-chain registry can verify. This crate holds the
//! values both sides agree on.
//!
//! # Overview
//!
//! - [`quorum`]: quorum ids, the reserved sentinel, seat accounting
//! - [`operator`]: 20-byte addresses and key-derived operator ids
//! - [`keys`] / [`keystore`]: signing keys and encrypted key files
//! - [`message`]: the request/reply exchanged with the authority
//! - [`digest`]: what operators and the authority actually sign
//! - [`abi`]: the registry's call parameters, encoded bit-exact
//!
//! # Flow
//!
//! ```text
//! operator                         authority
//!   │  ChurnRequest (signed) ───────▶ │  lock quorums, pick evictees,
//!   │                                 │  sign (operator, quorums,
//!   │ ◀─────── ChurnReply ─────────── │  evictions, salt, expiry)
//!   │
//!   └─▶ RegistrationParams ─▶ registry contract
//! ```

pub mod abi;
pub mod digest;
pub mod error;
pub mod hex_serde;
pub mod keys;
pub mod keystore;
pub mod message;
pub mod operator;
pub mod quorum;

pub use abi::{ChurnApproverSignature, OperatorKickParam, RegistrationParams, U256};
pub use digest::{approval_digest, request_digest};
pub use error::{Error, Result};
pub use keys::{KeyPair, PublicKey};
pub use keystore::Keystore;
pub use message::{
    ChurnReply, ChurnRequest, ErrorBody, OperatorToChurn, SignatureWithSaltAndExpiry, SALT_LENGTH,
};
pub use operator::{OperatorAddress, OperatorId};
pub use quorum::{QuorumId, QuorumSet, MAX_QUORUM_ID};

/// Current Unix time in seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
