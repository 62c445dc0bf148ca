//! The churn authority: turns a [`ChurnRequest`] into a signed [`ChurnReply`].
//!
//! # Request handling
//!
//! 1. Re-validate the quorum ids (`< MAX_QUORUM_ID`, ascending, non-empty)
//! 2. Verify the operator's signature over the request digest
//! 3. Apply the per-operator rate limit
//! 4. Reserve seats under the per-quorum locks ([`QuorumRegistry::reserve`])
//! 5. Sign (operator, quorums, evictions, salt, expiry) outside the locks
//!
//! Any failure before step 5 returns [`Error::AdmissionDenied`] and no reply.

use crate::config::AuthorityConfig;
use crate::error::{DenialReason, Error, Result};
use crate::registry::QuorumRegistry;
use churn_core::{
    approval_digest, unix_now, ChurnReply, ChurnRequest, KeyPair, PublicKey,
    SignatureWithSaltAndExpiry, SALT_LENGTH,
};
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

/// Context string for approval salt derivation.
const SALT_CONTEXT: &str = "churn authority 2024-01 approval salt";

/// Decides admissions and signs approvals.
pub struct ChurnAuthority {
    signing_key: KeyPair,
    registry: QuorumRegistry,
    approval_window: Duration,
    min_request_interval: Duration,
    last_request: Mutex<HashMap<PublicKey, i64>>,
}

impl ChurnAuthority {
    /// Create an authority.
    pub fn new(signing_key: KeyPair, registry: QuorumRegistry, config: &AuthorityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            signing_key,
            registry,
            approval_window: config.approval_window,
            min_request_interval: config.min_request_interval,
            last_request: Mutex::new(HashMap::new()),
        })
    }

    /// Public key clients use to check approvals.
    pub fn public_key(&self) -> PublicKey {
        self.signing_key.public_key()
    }

    pub fn registry(&self) -> &QuorumRegistry {
        &self.registry
    }

    /// Handle a request at the current time.
    pub fn handle(&self, request: &ChurnRequest) -> Result<ChurnReply> {
        self.handle_at(request, unix_now())
    }

    /// Handle a request as of Unix time `now`.
    pub fn handle_at(&self, request: &ChurnRequest, now: i64) -> Result<ChurnReply> {
        let result = self.decide(request, now);
        if let Err(Error::AdmissionDenied(reason)) = &result {
            warn!(
                "denied churn for {} on quorums {:?}: {}",
                request.operator_address(),
                request.quorum_ids(),
                reason
            );
        }
        result
    }

    fn decide(&self, request: &ChurnRequest, now: i64) -> Result<ChurnReply> {
        let quorums = request
            .quorum_set()
            .map_err(|e| DenialReason::MalformedRequest(e.to_string()))?;

        request
            .verify_operator_signature()
            .map_err(|_| DenialReason::BadOperatorSignature)?;

        self.check_rate_limit(request.operator_public_key(), now)?;

        let expiry = now + self.approval_window.as_secs() as i64;
        let operators_to_churn =
            self.registry
                .reserve(request.operator_address(), &quorums, expiry, now)?;

        // Locks are released; the eviction set is fixed.
        let salt = self.fresh_salt(request, now);
        let digest = approval_digest(
            request.operator_address(),
            &request.operator_id(),
            quorums.as_slice(),
            &operators_to_churn,
            &salt,
            expiry,
        );
        let signature = self.signing_key.sign(&digest);

        info!(
            "approved churn for {} on quorums {} with {} eviction(s), expiry {}",
            request.operator_address(),
            quorums,
            operators_to_churn.len(),
            expiry
        );

        Ok(ChurnReply {
            operators_to_churn,
            signature_with_salt_and_expiry: SignatureWithSaltAndExpiry {
                signature: signature.to_vec(),
                salt: salt.to_vec(),
                expiry,
            },
        })
    }

    /// Record this request and refuse it if the previous one from the same
    /// key is too recent. Only requests with a valid operator signature get
    /// here, so nobody can rate-limit someone else's key.
    fn check_rate_limit(&self, key: &PublicKey, now: i64) -> Result<()> {
        let interval = self.min_request_interval.as_secs() as i64;
        if interval == 0 {
            return Ok(());
        }

        let mut last = self.last_request.lock().map_err(|_| Error::LockPoisoned)?;
        // Entries older than one interval can no longer deny anything.
        last.retain(|_, seen| now - *seen < interval);
        if let Some(&previous) = last.get(key) {
            let next_allowed = previous + interval;
            if now < next_allowed {
                return Err(DenialReason::RateLimited {
                    retry_after_secs: next_allowed - now,
                }
                .into());
            }
        }
        last.insert(*key, now);
        Ok(())
    }

    /// A salt unique to this authorization: OS randomness bound to the
    /// request's own salt and the issue time.
    fn fresh_salt(&self, request: &ChurnRequest, now: i64) -> [u8; SALT_LENGTH] {
        let mut entropy = [0u8; 32];
        OsRng.fill_bytes(&mut entropy);

        let mut hasher = blake3::Hasher::new_derive_key(SALT_CONTEXT);
        hasher.update(&entropy);
        hasher.update(request.salt());
        hasher.update(&now.to_be_bytes());
        *hasher.finalize().as_bytes()
    }
}
