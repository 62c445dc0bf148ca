//! Operator identity: account addresses and key-derived ids.

use crate::error::{Error, Result};
use crate::keys::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Width of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// A 20-byte operator account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OperatorAddress(pub [u8; ADDRESS_LENGTH]);

impl OperatorAddress {
    /// Create an address from raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Convert arbitrary bytes the way the registry contract bindings do:
    /// longer input keeps its trailing 20 bytes, shorter input is
    /// left-padded with zeros.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut arr = [0u8; ADDRESS_LENGTH];
        if bytes.len() >= ADDRESS_LENGTH {
            arr.copy_from_slice(&bytes[bytes.len() - ADDRESS_LENGTH..]);
        } else {
            arr[ADDRESS_LENGTH - bytes.len()..].copy_from_slice(bytes);
        }
        Self(arr)
    }

    /// Parse from hex, with or without a `0x` prefix. Exactly 20 bytes.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = crate::hex_serde::decode(s.trim())
            .map_err(|e| Error::InvalidAddress(format!("{:?}: {}", s, e)))?;
        if bytes.len() != ADDRESS_LENGTH {
            return Err(Error::InvalidAddress(format!(
                "{:?}: expected {} bytes, got {}",
                s,
                ADDRESS_LENGTH,
                bytes.len()
            )));
        }
        Ok(Self::from_slice(&bytes))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl std::fmt::Display for OperatorAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for OperatorAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OperatorAddress({})", self.to_hex())
    }
}

impl std::str::FromStr for OperatorAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for OperatorAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OperatorAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A 32-byte operator id derived from the operator's public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatorId(pub [u8; 32]);

impl OperatorId {
    /// Derive the id from a public key using double BLAKE3.
    pub fn from_public_key(key: &PublicKey) -> Self {
        let hash1 = blake3::hash(key.as_bytes());
        let hash2 = blake3::hash(hash1.as_bytes());
        Self(*hash2.as_bytes())
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 hex chars
        write!(f, "{}...", &self.to_hex()[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;

    #[test]
    fn hex_round_trip_with_and_without_prefix() {
        let hex_str = "0xabcdef0123456789abcdef0123456789abcdef01";
        let a = OperatorAddress::from_hex(hex_str).unwrap();
        let b = OperatorAddress::from_hex(&hex_str[2..]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_hex(), hex_str);
        assert_eq!(a.to_string(), hex_str);
    }

    #[test]
    fn mixed_case_hex_is_accepted() {
        let a = OperatorAddress::from_hex("0xABCDEF0123456789abcdef0123456789ABCDEF01").unwrap();
        assert_eq!(a.to_hex(), "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn wrong_length_or_garbage_rejected() {
        assert!(matches!(
            OperatorAddress::from_hex("0xabcd"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            OperatorAddress::from_hex("not-an-address"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(OperatorAddress::from_hex(""), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn from_slice_left_pads_short_input() {
        let addr = OperatorAddress::from_slice(&[0xab, 0xcd]);
        let mut expected = [0u8; 20];
        expected[18] = 0xab;
        expected[19] = 0xcd;
        assert_eq!(addr.0, expected);
    }

    #[test]
    fn from_slice_keeps_trailing_bytes_of_long_input() {
        let mut long = vec![0xff; 12];
        long.extend_from_slice(&[7u8; 20]);
        assert_eq!(OperatorAddress::from_slice(&long).0, [7u8; 20]);
    }

    #[test]
    fn serde_uses_prefixed_hex() {
        let addr = OperatorAddress::from_bytes([0x11; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "11".repeat(20)));
        let back: OperatorAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn operator_id_is_stable_per_key() {
        let key = KeyPair::generate();
        let id1 = OperatorId::from_public_key(&key.public_key());
        let id2 = OperatorId::from_public_key(&key.public_key());
        assert_eq!(id1, id2);

        let other = KeyPair::generate();
        assert_ne!(id1, OperatorId::from_public_key(&other.public_key()));
    }
}
