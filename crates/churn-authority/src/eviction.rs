//! Per-quorum seat decision.
//!
//! Given a quorum's capacity, its ranked incumbents and the authorizations
//! already outstanding, decide how a new operator gets a seat:
//!
//! ```text
//! occupied = incumbents + outstanding free-seat grants
//! occupied <  capacity  → Free
//! occupied >= capacity  → Evict(weakest incumbent not already reserved)
//!                        → no such incumbent: deny
//! ```
//!
//! The function is pure. Callers hold the quorum's lock around it and around
//! recording the outcome, so two requests never see the same free incumbent.

use crate::error::DenialReason;
use churn_core::quorum::requires_eviction;
use churn_core::{OperatorAddress, QuorumId};

/// How the joining operator gets a seat in one quorum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    /// A seat is free, nobody is evicted.
    Free,
    /// The named incumbent is evicted.
    Evict(OperatorAddress),
}

/// An authorization that has been issued but not yet expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    /// The operator the authorization admits.
    pub operator: OperatorAddress,
    /// Who it evicts, if anyone.
    pub evictee: Option<OperatorAddress>,
    /// Unix expiry of the authorization.
    pub expiry: i64,
}

impl Reservation {
    pub fn is_live(&self, now: i64) -> bool {
        self.expiry > now
    }
}

/// Decide the seat for `operator` in `quorum`.
///
/// `incumbents` is ordered weakest last. `reservations` must only hold live
/// entries for this quorum.
pub fn decide_seat(
    quorum: QuorumId,
    capacity: usize,
    operator: &OperatorAddress,
    incumbents: &[OperatorAddress],
    reservations: &[Reservation],
) -> Result<Seat, DenialReason> {
    if incumbents.contains(operator) {
        return Err(DenialReason::AlreadyRegistered(quorum));
    }
    if reservations.iter().any(|r| &r.operator == operator) {
        return Err(DenialReason::PendingAuthorization(quorum));
    }

    let free_grants = reservations.iter().filter(|r| r.evictee.is_none()).count();
    if !requires_eviction(capacity, incumbents.len() + free_grants) {
        return Ok(Seat::Free);
    }

    incumbents
        .iter()
        .rev()
        .find(|candidate| !reservations.iter().any(|r| r.evictee.as_ref() == Some(*candidate)))
        .map(|weakest| Seat::Evict(*weakest))
        .ok_or(DenialReason::NoEvictableIncumbent(quorum))
}
