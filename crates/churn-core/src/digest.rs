//! Canonical digests signed by operators and by the churn authority.
//!
//! Each digest is a domain-separated BLAKE3 hash over a fixed field order.
//! Variable-length fields carry a big-endian length prefix so that no two
//! distinct field tuples hash the same input stream.

use crate::keys::PublicKey;
use crate::message::OperatorToChurn;
use crate::operator::{OperatorAddress, OperatorId};
use crate::quorum::QuorumId;

/// Domain tag for operator request signatures.
pub const REQUEST_DOMAIN: &[u8] = b"churn-request-v1";

/// Domain tag for authority approval signatures.
pub const APPROVAL_DOMAIN: &[u8] = b"churn-approval-v1";

fn update_prefixed(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u32).to_be_bytes());
    hasher.update(bytes);
}

/// Digest the operator signs: (address, public key, quorums, request salt).
pub fn request_digest(
    address: &OperatorAddress,
    public_key: &PublicKey,
    quorums: &[QuorumId],
    salt: &[u8; 32],
) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(REQUEST_DOMAIN);
    hasher.update(address.as_bytes());
    hasher.update(public_key.as_bytes());
    update_prefixed(&mut hasher, quorums);
    hasher.update(salt);
    *hasher.finalize().as_bytes()
}

/// Digest the authority signs.
///
/// Covers the whole authorization as a unit: operator identity, requested
/// quorums, eviction list, salt and expiry.
pub fn approval_digest(
    address: &OperatorAddress,
    operator_id: &OperatorId,
    quorums: &[QuorumId],
    operators_to_churn: &[OperatorToChurn],
    salt: &[u8],
    expiry: i64,
) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(APPROVAL_DOMAIN);
    hasher.update(address.as_bytes());
    hasher.update(operator_id.as_bytes());
    update_prefixed(&mut hasher, quorums);
    hasher.update(&(operators_to_churn.len() as u32).to_be_bytes());
    for entry in operators_to_churn {
        hasher.update(&[entry.quorum_id]);
        update_prefixed(&mut hasher, &entry.operator);
    }
    update_prefixed(&mut hasher, salt);
    hasher.update(&expiry.to_be_bytes());
    *hasher.finalize().as_bytes()
}
