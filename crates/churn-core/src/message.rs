//! Request/reply shapes exchanged with the churn authority.

use crate::digest::request_digest;
use crate::error::{Error, Result};
use crate::keys::{KeyPair, PublicKey, SIGNATURE_LENGTH};
use crate::operator::{OperatorAddress, OperatorId};
use crate::quorum::{QuorumId, QuorumSet};
use serde::{Deserialize, Serialize};

/// Length of authorization and request salts.
pub const SALT_LENGTH: usize = 32;

/// An admission request from a joining operator.
///
/// Built once per attempt and not mutated afterwards. The operator signs the
/// request digest, which proves possession of the key and binds the fresh
/// `salt` so a captured request cannot be replayed under a new salt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnRequest {
    operator_address: OperatorAddress,
    operator_public_key: PublicKey,
    quorum_ids: Vec<QuorumId>,
    #[serde(with = "crate::hex_serde::array")]
    salt: [u8; SALT_LENGTH],
    #[serde(with = "crate::hex_serde::array")]
    operator_signature: [u8; SIGNATURE_LENGTH],
}

impl ChurnRequest {
    /// Assemble and sign a request.
    pub fn new_signed(
        operator_address: OperatorAddress,
        key_pair: &KeyPair,
        quorums: QuorumSet,
        salt: [u8; SALT_LENGTH],
    ) -> Self {
        let operator_public_key = key_pair.public_key();
        let digest = request_digest(&operator_address, &operator_public_key, quorums.as_slice(), &salt);
        Self {
            operator_address,
            operator_public_key,
            quorum_ids: quorums.into_vec(),
            salt,
            operator_signature: key_pair.sign(&digest),
        }
    }

    pub fn operator_address(&self) -> &OperatorAddress {
        &self.operator_address
    }

    pub fn operator_public_key(&self) -> &PublicKey {
        &self.operator_public_key
    }

    pub fn operator_id(&self) -> OperatorId {
        OperatorId::from_public_key(&self.operator_public_key)
    }

    /// Quorum ids exactly as carried on the wire.
    pub fn quorum_ids(&self) -> &[QuorumId] {
        &self.quorum_ids
    }

    /// Re-validate the carried quorum ids.
    pub fn quorum_set(&self) -> Result<QuorumSet> {
        let set = QuorumSet::from_ids(&self.quorum_ids)?;
        if set.as_slice() != self.quorum_ids.as_slice() {
            return Err(Error::Malformed {
                field: "quorum_ids",
                reason: "must be ascending without duplicates".to_string(),
            });
        }
        Ok(set)
    }

    pub fn salt(&self) -> &[u8; SALT_LENGTH] {
        &self.salt
    }

    /// Check the operator's signature over the request digest.
    pub fn verify_operator_signature(&self) -> Result<()> {
        let digest = request_digest(
            &self.operator_address,
            &self.operator_public_key,
            &self.quorum_ids,
            &self.salt,
        );
        self.operator_public_key.verify(&digest, &self.operator_signature)
    }
}

/// One eviction decided by the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorToChurn {
    pub quorum_id: QuorumId,
    /// Raw address bytes of the operator to evict.
    #[serde(with = "crate::hex_serde::bytes")]
    pub operator: Vec<u8>,
}

/// The authority's signature with its anti-replay salt and expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureWithSaltAndExpiry {
    #[serde(with = "crate::hex_serde::bytes")]
    pub signature: Vec<u8>,
    #[serde(with = "crate::hex_serde::bytes")]
    pub salt: Vec<u8>,
    /// Unix timestamp (seconds) after which the signature is invalid.
    pub expiry: i64,
}

/// The authority's answer to a [`ChurnRequest`].
///
/// An empty `operators_to_churn` means free admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnReply {
    pub operators_to_churn: Vec<OperatorToChurn>,
    pub signature_with_salt_and_expiry: SignatureWithSaltAndExpiry,
}

/// Error body returned by the authority's HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}
