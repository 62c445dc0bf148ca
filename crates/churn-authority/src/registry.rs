//! Authority-side quorum state.
//!
//! One mutex per configured quorum guards that quorum's outstanding
//! reservations. A request locks all of its quorums in ascending id order,
//! decides every seat, and only then records reservations. Either every
//! quorum is reserved or none is.

use crate::error::{DenialReason, Error, Result};
use crate::eviction::{decide_seat, Reservation, Seat};
use crate::ranking::RankingSource;
use churn_core::{OperatorAddress, OperatorToChurn, QuorumId, QuorumSet};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Mutable state of one quorum.
#[derive(Debug)]
struct QuorumSeats {
    capacity: usize,
    reservations: Vec<Reservation>,
}

impl QuorumSeats {
    /// Drop expired reservations and those whose admitted operator already
    /// shows up as an incumbent.
    fn prune(&mut self, now: i64, incumbents: &[OperatorAddress]) {
        self.reservations
            .retain(|r| r.is_live(now) && !incumbents.contains(&r.operator));
    }
}

/// Shared per-quorum seat bookkeeping.
pub struct QuorumRegistry {
    quorums: BTreeMap<QuorumId, Mutex<QuorumSeats>>,
    ranking: Arc<dyn RankingSource>,
}

impl QuorumRegistry {
    /// Create a registry for the given quorum capacities.
    pub fn new(capacities: BTreeMap<QuorumId, usize>, ranking: Arc<dyn RankingSource>) -> Self {
        let quorums = capacities
            .into_iter()
            .map(|(id, capacity)| {
                (
                    id,
                    Mutex::new(QuorumSeats {
                        capacity,
                        reservations: Vec::new(),
                    }),
                )
            })
            .collect();
        Self { quorums, ranking }
    }

    /// Quorums this registry manages.
    pub fn quorum_ids(&self) -> impl Iterator<Item = QuorumId> + '_ {
        self.quorums.keys().copied()
    }

    /// Decide and reserve seats for `operator` in every quorum of `quorums`.
    ///
    /// Returns the evictions in ascending quorum order. Nothing is recorded
    /// unless every quorum admits the operator.
    pub fn reserve(
        &self,
        operator: &OperatorAddress,
        quorums: &QuorumSet,
        expiry: i64,
        now: i64,
    ) -> Result<Vec<OperatorToChurn>> {
        // Resolve first so an unknown quorum fails before any lock is taken.
        let mut slots = Vec::with_capacity(quorums.len());
        for id in quorums.iter() {
            let slot = self
                .quorums
                .get(&id)
                .ok_or(DenialReason::UnknownQuorum(id))?;
            slots.push((id, slot));
        }

        // `QuorumSet` is ascending, so locks are always taken in id order.
        let mut guards: Vec<(QuorumId, MutexGuard<'_, QuorumSeats>)> = Vec::with_capacity(slots.len());
        for (id, slot) in slots {
            let guard = slot.lock().map_err(|_| Error::LockPoisoned)?;
            guards.push((id, guard));
        }

        let mut seats = Vec::with_capacity(guards.len());
        for (id, seats_state) in guards.iter_mut() {
            let incumbents = self.ranking.ranked_incumbents(*id).map_err(|e| {
                DenialReason::RankingUnavailable {
                    quorum: *id,
                    reason: e.to_string(),
                }
            })?;
            seats_state.prune(now, &incumbents);
            let seat = decide_seat(
                *id,
                seats_state.capacity,
                operator,
                &incumbents,
                &seats_state.reservations,
            )?;
            debug!("quorum {}: {} incumbents, seat {:?}", id, incumbents.len(), seat);
            seats.push(seat);
        }

        let mut operators_to_churn = Vec::new();
        for ((id, seats_state), seat) in guards.iter_mut().zip(seats) {
            let evictee = match seat {
                Seat::Free => None,
                Seat::Evict(evictee) => {
                    operators_to_churn.push(OperatorToChurn {
                        quorum_id: *id,
                        operator: evictee.as_bytes().to_vec(),
                    });
                    Some(evictee)
                }
            };
            seats_state.reservations.push(Reservation {
                operator: *operator,
                evictee,
                expiry,
            });
        }

        Ok(operators_to_churn)
    }

    /// Live reservations in `quorum`, for inspection.
    pub fn outstanding(&self, quorum: QuorumId, now: i64) -> Result<usize> {
        let slot = self
            .quorums
            .get(&quorum)
            .ok_or(DenialReason::UnknownQuorum(quorum))?;
        let seats = slot.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(seats.reservations.iter().filter(|r| r.is_live(now)).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{RankingError, StaticRanking};

    fn addr(b: u8) -> OperatorAddress {
        OperatorAddress::from_bytes([b; 20])
    }

    fn registry() -> QuorumRegistry {
        let ranking = StaticRanking::default()
            .with_quorum(0, vec![])
            .with_quorum(1, vec![addr(1)])
            .with_quorum(2, vec![addr(1), addr(2), addr(0xab)]);
        let capacities = BTreeMap::from([(0, 2), (1, 5), (2, 3)]);
        QuorumRegistry::new(capacities, Arc::new(ranking))
    }

    fn quorums(s: &str) -> QuorumSet {
        QuorumSet::parse(s).unwrap()
    }

    #[test]
    fn free_admission_records_grant() {
        let registry = registry();
        let churn = registry.reserve(&addr(9), &quorums("0,1"), 200, 100).unwrap();
        assert!(churn.is_empty());
        assert_eq!(registry.outstanding(0, 100).unwrap(), 1);
        assert_eq!(registry.outstanding(1, 100).unwrap(), 1);
    }

    #[test]
    fn full_quorum_evicts_weakest_then_next() {
        let registry = registry();
        let first = registry.reserve(&addr(9), &quorums("2"), 200, 100).unwrap();
        assert_eq!(
            first,
            vec![OperatorToChurn {
                quorum_id: 2,
                operator: addr(0xab).as_bytes().to_vec()
            }]
        );

        let second = registry.reserve(&addr(10), &quorums("2"), 200, 100).unwrap();
        assert_eq!(second[0].operator, addr(2).as_bytes().to_vec());
    }

    #[test]
    fn expired_reservations_release_incumbent() {
        let registry = registry();
        registry.reserve(&addr(9), &quorums("2"), 200, 100).unwrap();
        // After expiry the weakest incumbent is selectable again.
        let later = registry.reserve(&addr(10), &quorums("2"), 400, 300).unwrap();
        assert_eq!(later[0].operator, addr(0xab).as_bytes().to_vec());
    }

    #[test]
    fn unknown_quorum_denied_without_side_effects() {
        let registry = registry();
        let err = registry.reserve(&addr(9), &quorums("0,7"), 200, 100).unwrap_err();
        assert_eq!(err.denial(), Some(&DenialReason::UnknownQuorum(7)));
        assert_eq!(registry.outstanding(0, 100).unwrap(), 0);
    }

    #[test]
    fn multi_quorum_request_is_all_or_nothing() {
        let registry = registry();
        // Quorum 1 already has addr(1) as incumbent, so the whole request fails
        // and quorum 0 must not keep a grant.
        let err = registry.reserve(&addr(1), &quorums("0,1"), 200, 100).unwrap_err();
        assert_eq!(err.denial(), Some(&DenialReason::AlreadyRegistered(1)));
        assert_eq!(registry.outstanding(0, 100).unwrap(), 0);
    }

    #[test]
    fn pending_grant_fills_capacity() {
        let registry = registry();
        registry.reserve(&addr(8), &quorums("0"), 200, 100).unwrap();
        registry.reserve(&addr(9), &quorums("0"), 200, 100).unwrap();
        // Capacity 2 is taken by two grants and there is no incumbent to evict.
        let err = registry.reserve(&addr(10), &quorums("0"), 200, 100).unwrap_err();
        assert_eq!(err.denial(), Some(&DenialReason::NoEvictableIncumbent(0)));
    }

    struct Unavailable;

    impl RankingSource for Unavailable {
        fn ranked_incumbents(&self, _quorum: QuorumId) -> std::result::Result<Vec<OperatorAddress>, RankingError> {
            Err(RankingError("stake service down".to_string()))
        }
    }

    #[test]
    fn ranking_failure_denies() {
        let registry = QuorumRegistry::new(BTreeMap::from([(0, 1)]), Arc::new(Unavailable));
        let err = registry.reserve(&addr(9), &quorums("0"), 200, 100).unwrap_err();
        assert!(matches!(
            err.denial(),
            Some(DenialReason::RankingUnavailable { quorum: 0, .. })
        ));
    }

    #[test]
    fn concurrent_requests_never_share_an_evictee() {
        let registry = Arc::new(registry());
        let handles: Vec<_> = (0..3u8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.reserve(&addr(100 + i), &quorums("2"), 200, 100))
            })
            .collect();

        let mut evictees: Vec<Vec<u8>> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap()[0].operator.clone())
            .collect();
        evictees.sort();
        evictees.dedup();
        assert_eq!(evictees.len(), 3);
    }
}
