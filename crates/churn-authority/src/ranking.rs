//! Incumbent ranking.
//!
//! Which incumbent is "weakest" is decided outside this crate (stake,
//! reputation, ...). The eviction logic only sees a [`RankingSource`] that
//! lists a quorum's incumbents strongest first, weakest last.

use crate::error::{Error, Result};
use churn_core::{OperatorAddress, QuorumId, MAX_QUORUM_ID};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Failure to obtain a ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingError(pub String);

impl std::fmt::Display for RankingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for RankingError {}

/// Source of per-quorum incumbent rankings.
///
/// Called synchronously while a request is decided, on a blocking worker
/// thread rather than an async task, so implementations may do blocking
/// I/O. Every call holds up one churn request for its whole duration.
pub trait RankingSource: Send + Sync {
    /// Current incumbents of `quorum`, weakest last.
    fn ranked_incumbents(&self, quorum: QuorumId) -> std::result::Result<Vec<OperatorAddress>, RankingError>;
}

/// One operator entry of a membership file.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberEntry {
    pub address: OperatorAddress,
    pub stake: u64,
}

/// One quorum of a membership file.
#[derive(Debug, Clone, Deserialize)]
pub struct QuorumEntry {
    pub id: QuorumId,
    pub capacity: usize,
    #[serde(default)]
    pub operators: Vec<MemberEntry>,
}

/// Static quorum membership, loaded from JSON.
///
/// ```json
/// { "quorums": [ { "id": 0, "capacity": 3,
///                  "operators": [ { "address": "0x…", "stake": 100 } ] } ] }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Membership {
    pub quorums: Vec<QuorumEntry>,
}

impl Membership {
    /// Load and validate a membership file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let membership: Membership = serde_json::from_slice(&data)?;
        membership.validate()?;
        Ok(membership)
    }

    /// Reject sentinel ids and duplicate quorums.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for quorum in &self.quorums {
            if quorum.id >= MAX_QUORUM_ID {
                return Err(Error::Config(format!(
                    "quorum id {} is out of range (must be below {})",
                    quorum.id, MAX_QUORUM_ID
                )));
            }
            if !seen.insert(quorum.id) {
                return Err(Error::Config(format!("quorum {} listed twice", quorum.id)));
            }
            if quorum.operators.len() > quorum.capacity {
                tracing::warn!(
                    "quorum {} lists {} operators over a capacity of {}",
                    quorum.id,
                    quorum.operators.len(),
                    quorum.capacity
                );
            }
        }
        Ok(())
    }

    /// Capacity per quorum.
    pub fn capacities(&self) -> BTreeMap<QuorumId, usize> {
        self.quorums.iter().map(|q| (q.id, q.capacity)).collect()
    }
}

/// Ranking by stake from a fixed membership snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticRanking {
    quorums: BTreeMap<QuorumId, Vec<OperatorAddress>>,
}

impl StaticRanking {
    /// Rank each quorum by stake, highest first. Ties break on address so
    /// the order is deterministic.
    pub fn from_membership(membership: &Membership) -> Self {
        let quorums = membership
            .quorums
            .iter()
            .map(|quorum| {
                let mut members = quorum.operators.clone();
                members.sort_by(|a, b| b.stake.cmp(&a.stake).then(a.address.cmp(&b.address)));
                (quorum.id, members.into_iter().map(|m| m.address).collect())
            })
            .collect();
        Self { quorums }
    }

    /// Use an explicit weakest-last ordering for a quorum.
    pub fn with_quorum(mut self, quorum: QuorumId, ranked: Vec<OperatorAddress>) -> Self {
        self.quorums.insert(quorum, ranked);
        self
    }
}

impl RankingSource for StaticRanking {
    fn ranked_incumbents(&self, quorum: QuorumId) -> std::result::Result<Vec<OperatorAddress>, RankingError> {
        self.quorums
            .get(&quorum)
            .cloned()
            .ok_or_else(|| RankingError(format!("no ranking for quorum {}", quorum)))
    }
}
