//! Quorum identifiers and per-quorum seat accounting.
//!
//! A quorum id is an 8-bit number. The top value is reserved:
//! - `0..MAX_QUORUM_ID` → assignable to real quorums
//! - `MAX_QUORUM_ID` (255) → sentinel, never valid in a request or reply
//!
//! Every boundary (request build, authority intake, reply validation) checks
//! the bound itself instead of trusting an earlier checkpoint.

use crate::error::{Error, Result};

/// Identifier of a quorum.
pub type QuorumId = u8;

/// Reserved sentinel. Legal quorum ids are strictly below it.
pub const MAX_QUORUM_ID: QuorumId = 255;

/// Separator between ids in a textual quorum list (`"0,1"`).
pub const QUORUM_LIST_SEPARATOR: char = ',';

/// Check that a raw value is a legal quorum id.
///
/// ```
/// use churn_core::quorum::check_quorum_id;
///
/// assert_eq!(check_quorum_id(2).unwrap(), 2);
/// assert!(check_quorum_id(255).is_err()); // sentinel
/// assert!(check_quorum_id(300).is_err());
/// ```
pub fn check_quorum_id(value: u64) -> Result<QuorumId> {
    if value >= u64::from(MAX_QUORUM_ID) {
        return Err(Error::Range {
            value,
            max: MAX_QUORUM_ID,
        });
    }
    Ok(value as QuorumId)
}

/// Number of free seats in a quorum with `capacity` seats and `occupied` taken.
pub const fn seats_available(capacity: usize, occupied: usize) -> usize {
    if occupied >= capacity {
        0
    } else {
        capacity - occupied
    }
}

/// Whether admitting one more operator requires an eviction.
pub const fn requires_eviction(capacity: usize, occupied: usize) -> bool {
    seats_available(capacity, occupied) == 0
}

/// Parse an unsigned decimal token. All-digit tokens too large for `u64`
/// saturate so they are reported as out of range, not malformed.
fn parse_decimal(token: &str) -> Result<u64> {
    match token.parse::<u64>() {
        Ok(value) => Ok(value),
        Err(_) if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) => Ok(u64::MAX),
        Err(_) => Err(Error::Parse {
            token: token.to_string(),
        }),
    }
}

/// A validated, non-empty, deduplicated set of quorum ids in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuorumSet(Vec<QuorumId>);

impl QuorumSet {
    /// Parse a comma-separated list of decimal quorum ids.
    ///
    /// Tokens are trimmed. Empty tokens (`"0,,1"`) and anything that is not
    /// an unsigned decimal integer fail with [`Error::Parse`]; values at or
    /// above [`MAX_QUORUM_ID`] fail with [`Error::Range`].
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut ids = Vec::new();
        for raw in input.split(QUORUM_LIST_SEPARATOR) {
            let token = raw.trim();
            ids.push(check_quorum_id(parse_decimal(token)?)?);
        }

        Self::from_ids(&ids)
    }

    /// Build a set from already-typed ids, re-checking the bound.
    pub fn from_ids(ids: &[QuorumId]) -> Result<Self> {
        for &id in ids {
            check_quorum_id(u64::from(id))?;
        }

        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(Self(ids))
    }

    /// Ids in ascending order.
    pub fn as_slice(&self) -> &[QuorumId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = QuorumId> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, id: QuorumId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<QuorumId> {
        self.0
    }
}

impl std::fmt::Display for QuorumSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|id| id.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_single_and_multiple() {
        assert_eq!(QuorumSet::parse("0").unwrap().as_slice(), &[0]);
        assert_eq!(QuorumSet::parse("0,1").unwrap().as_slice(), &[0, 1]);
        assert_eq!(QuorumSet::parse(" 1 , 0 ").unwrap().as_slice(), &[0, 1]);
    }

    #[test]
    fn parse_dedups_and_sorts() {
        let set = QuorumSet::parse("3,1,3,0,1").unwrap();
        assert_eq!(set.as_slice(), &[0, 1, 3]);
        assert_eq!(set.to_string(), "0,1,3");
    }

    #[test]
    fn sentinel_is_out_of_range() {
        match QuorumSet::parse("255") {
            Err(Error::Range { value, max }) => {
                assert_eq!(value, 255);
                assert_eq!(max, MAX_QUORUM_ID);
            }
            other => panic!("expected range error, got {:?}", other),
        }
        assert!(matches!(
            QuorumSet::parse("0,254,300"),
            Err(Error::Range { value: 300, .. })
        ));
    }

    #[test]
    fn overflowing_value_is_range_error() {
        assert!(matches!(
            QuorumSet::parse("0,99999999999999999999"),
            Err(Error::Range { value: u64::MAX, .. })
        ));
        assert!(matches!(
            QuorumSet::parse("18446744073709551616"),
            Err(Error::Range { .. })
        ));
        // Still malformed, however long.
        assert!(matches!(
            QuorumSet::parse("99999999999999999999x"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn highest_legal_id_accepted() {
        assert_eq!(QuorumSet::parse("254").unwrap().as_slice(), &[254]);
    }

    #[test]
    fn malformed_tokens_rejected() {
        for input in ["a", "0,x", "0,,1", "-1", "1.5", "0x01", "0,"] {
            assert!(
                matches!(QuorumSet::parse(input), Err(Error::Parse { .. })),
                "{:?} should be a parse error",
                input
            );
        }
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(QuorumSet::parse(""), Err(Error::EmptyInput)));
        assert!(matches!(QuorumSet::parse("   "), Err(Error::EmptyInput)));
        assert!(matches!(QuorumSet::from_ids(&[]), Err(Error::EmptyInput)));
    }

    #[test]
    fn from_ids_rechecks_bound() {
        assert!(matches!(
            QuorumSet::from_ids(&[1, MAX_QUORUM_ID]),
            Err(Error::Range { value: 255, .. })
        ));
    }

    #[test]
    fn seat_accounting() {
        assert_eq!(seats_available(3, 0), 3);
        assert_eq!(seats_available(3, 2), 1);
        assert_eq!(seats_available(3, 3), 0);
        assert_eq!(seats_available(3, 5), 0); // over-full never underflows
        assert!(!requires_eviction(3, 2));
        assert!(requires_eviction(3, 3));
        assert!(requires_eviction(0, 0));
    }

    proptest! {
        #[test]
        fn parse_equals_dedup_of_input(ids in proptest::collection::vec(0u8..MAX_QUORUM_ID, 1..16)) {
            let input = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
            let set = QuorumSet::parse(&input).unwrap();

            let mut expected = ids.clone();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(set.as_slice(), expected.as_slice());

            // Same input, same order.
            prop_assert_eq!(QuorumSet::parse(&input).unwrap(), set);
        }

        #[test]
        fn any_value_at_or_above_sentinel_is_range_error(
            ids in proptest::collection::vec(0u8..MAX_QUORUM_ID, 0..8),
            bad in prop_oneof![
                (255u64..100_000).prop_map(|v| v.to_string()),
                any::<u64>().prop_map(|v| v.max(255).to_string()),
                "[1-9][0-9]{19,40}",
            ],
        ) {
            let mut tokens: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            tokens.push(bad);
            let input = tokens.join(",");
            let is_range = matches!(QuorumSet::parse(&input), Err(Error::Range { .. }));
            prop_assert!(is_range);
        }
    }
}
