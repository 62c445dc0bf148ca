//! Building admission requests.
//!
//! All validation happens here, before anything touches the network.

use crate::error::{Error, Result};
use churn_core::{ChurnRequest, KeyPair, OperatorAddress, QuorumSet, SALT_LENGTH};
use rand::rngs::OsRng;
use rand::RngCore;

/// Build a signed request with a fresh random salt.
///
/// `quorums` is a comma-separated list such as `"0,1"`.
pub fn build_churn_request(
    operator_address: &str,
    key_pair: &KeyPair,
    quorums: &str,
) -> Result<ChurnRequest> {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    build_churn_request_with_salt(operator_address, key_pair, quorums, salt)
}

/// Build a signed request with a caller-chosen salt.
pub fn build_churn_request_with_salt(
    operator_address: &str,
    key_pair: &KeyPair,
    quorums: &str,
    salt: [u8; SALT_LENGTH],
) -> Result<ChurnRequest> {
    let quorums = QuorumSet::parse(quorums).map_err(Error::Request)?;
    let address = OperatorAddress::from_hex(operator_address).map_err(Error::Request)?;
    Ok(ChurnRequest::new_signed(address, key_pair, quorums, salt))
}
