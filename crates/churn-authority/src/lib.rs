//! Churn Authority - admission decisions for capacity-bounded quorums
//!
//! The authority receives signed [`churn_core::ChurnRequest`]s, decides per
//! quorum whether the joining operator takes a free seat or evicts the
//! weakest incumbent, and returns an approval signed over the whole
//! decision with a fresh salt and a short expiry.
//!
//! # Architecture
//!
//! - **Ranking**: [`RankingSource`] lists incumbents weakest last; the
//!   daemon uses [`StaticRanking`] built from a membership file
//! - **Eviction**: [`eviction::decide_seat`] is the pure per-quorum decision
//! - **Registry**: [`QuorumRegistry`] serializes decisions per quorum and
//!   tracks outstanding authorizations until they expire
//! - **Authority**: [`ChurnAuthority`] validates, reserves, signs
//! - **API**: axum router exposing `POST /api/v1/churn`
//!
//! # Example
//!
//! ```no_run
//! use churn_authority::{AuthorityConfig, ChurnAuthority, Membership, QuorumRegistry, StaticRanking};
//! use churn_core::KeyPair;
//! use std::sync::Arc;
//!
//! # fn main() -> churn_authority::Result<()> {
//! let config = AuthorityConfig::from_env()?;
//! let membership = Membership::load(&config.membership_file)?;
//! let ranking = Arc::new(StaticRanking::from_membership(&membership));
//! let registry = QuorumRegistry::new(membership.capacities(), ranking);
//! let authority = ChurnAuthority::new(KeyPair::generate(), registry, &config)?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod authority;
pub mod config;
pub mod error;
pub mod eviction;
pub mod ranking;
pub mod registry;

pub use authority::ChurnAuthority;
pub use config::AuthorityConfig;
pub use error::{DenialReason, Error, Result};
pub use ranking::{Membership, RankingError, RankingSource, StaticRanking};
pub use registry::QuorumRegistry;
