//! Local checks on an authorization before it is surfaced.
//!
//! The registry contract is the final judge. Checking here turns a late
//! on-chain revert into an immediate, specific error.

use crate::error::{Error, Result};
use churn_core::quorum::check_quorum_id;
use churn_core::{approval_digest, ChurnReply, ChurnRequest, Error as CoreError, PublicKey};
use std::collections::BTreeSet;
use tracing::debug;

/// Validates replies against the request they answer.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationVerifier {
    authority_key: Option<PublicKey>,
}

impl AuthorizationVerifier {
    /// `authority_key` enables the signature check. Without it only
    /// structural and expiry checks run.
    pub fn new(authority_key: Option<PublicKey>) -> Self {
        Self { authority_key }
    }

    pub fn authority_key(&self) -> Option<&PublicKey> {
        self.authority_key.as_ref()
    }

    /// Check `reply` as an answer to `request` at Unix time `now`.
    pub fn verify(&self, request: &ChurnRequest, reply: &ChurnReply, now: i64) -> Result<()> {
        let approval = &reply.signature_with_salt_and_expiry;
        if approval.expiry <= now {
            return Err(Error::Expired {
                expiry: approval.expiry,
                now,
            });
        }

        // At most one eviction per quorum, and only for quorums we asked for.
        let mut seen = BTreeSet::new();
        for entry in &reply.operators_to_churn {
            let quorum = check_quorum_id(u64::from(entry.quorum_id)).map_err(Error::Validation)?;
            if !request.quorum_ids().contains(&quorum) {
                return Err(Error::Validation(CoreError::Malformed {
                    field: "operators_to_churn",
                    reason: format!("eviction for unrequested quorum {}", quorum),
                }));
            }
            if !seen.insert(quorum) {
                return Err(Error::Validation(CoreError::Malformed {
                    field: "operators_to_churn",
                    reason: format!("more than one eviction for quorum {}", quorum),
                }));
            }
        }

        match &self.authority_key {
            Some(key) => {
                let digest = approval_digest(
                    request.operator_address(),
                    &request.operator_id(),
                    request.quorum_ids(),
                    &reply.operators_to_churn,
                    &approval.salt,
                    approval.expiry,
                );
                key.verify(&digest, &approval.signature)
                    .map_err(Error::Validation)?;
                debug!("authority signature verified against {}", key);
            }
            None => debug!("no authority key configured, skipping signature check"),
        }
        Ok(())
    }
}
