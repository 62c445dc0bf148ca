//! On-chain registration parameters and their ABI encoding.
//!
//! The registry's `registerOperatorWithChurn` call takes
//! `OperatorKickParam[]` and a `SignatureWithSaltAndExpiry`. The encodings
//! here are the same bytes `abi.encode(value)` produces for those types:
//! 32-byte big-endian words, dynamic `bytes` length-prefixed and
//! right-padded to a word boundary.

use crate::operator::OperatorAddress;
use crate::quorum::QuorumId;

/// ABI word size.
pub const WORD: usize = 32;

/// A 256-bit unsigned integer stored as big-endian bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct U256(pub [u8; 32]);

impl U256 {
    pub const ZERO: Self = Self([0u8; 32]);

    pub const fn to_be_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// The value as a `u64`, if it fits.
    pub fn as_u64(&self) -> Option<u64> {
        if self.0[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.0[24..]);
        Some(u64::from_be_bytes(low))
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl std::fmt::Display for U256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Repeated division by ten over the big-endian bytes.
        let mut n = self.0;
        let mut digits = Vec::new();
        while n.iter().any(|b| *b != 0) {
            let mut rem: u32 = 0;
            for byte in n.iter_mut() {
                let cur = (rem << 8) | u32::from(*byte);
                *byte = (cur / 10) as u8;
                rem = cur % 10;
            }
            digits.push(b'0' + rem as u8);
        }
        if digits.is_empty() {
            return write!(f, "0");
        }
        digits.reverse();
        // Digits are ASCII by construction.
        write!(f, "{}", String::from_utf8_lossy(&digits))
    }
}

/// One eviction in the registry's call shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatorKickParam {
    pub quorum_number: u8,
    pub operator: OperatorAddress,
}

impl OperatorKickParam {
    pub fn new(quorum_number: QuorumId, operator: OperatorAddress) -> Self {
        Self {
            quorum_number,
            operator,
        }
    }

    /// The static tuple `(uint8, address)` as two words.
    pub fn abi_words(&self) -> [u8; 2 * WORD] {
        let mut out = [0u8; 2 * WORD];
        out[WORD - 1] = self.quorum_number;
        out[2 * WORD - 20..].copy_from_slice(self.operator.as_bytes());
        out
    }
}

impl std::fmt::Display for OperatorKickParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{quorumNumber: {}, operator: {}}}",
            self.quorum_number, self.operator
        )
    }
}

/// The authority's approval in the registry's verifier shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChurnApproverSignature {
    pub signature: Vec<u8>,
    pub salt: [u8; 32],
    pub expiry: U256,
}

/// Everything the registration transaction needs from a churn exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistrationParams {
    pub operator_kick_params: Vec<OperatorKickParam>,
    pub churn_approver_signature: ChurnApproverSignature,
}

impl RegistrationParams {
    /// `abi.encode(OperatorKickParam[])`.
    pub fn abi_encode_kick_params(&self) -> Vec<u8> {
        let params = &self.operator_kick_params;
        let mut out = Vec::with_capacity(2 * WORD + params.len() * 2 * WORD);
        out.extend_from_slice(&word_from_usize(WORD));
        out.extend_from_slice(&word_from_usize(params.len()));
        for param in params {
            out.extend_from_slice(&param.abi_words());
        }
        out
    }

    /// `abi.encode(SignatureWithSaltAndExpiry)`, i.e. `(bytes, bytes32, uint256)`.
    pub fn abi_encode_signature(&self) -> Vec<u8> {
        let sig = &self.churn_approver_signature;
        let padded_len = sig.signature.len().div_ceil(WORD) * WORD;

        let mut out = Vec::with_capacity(6 * WORD + padded_len);
        // Offset of the tuple, then the tuple head.
        out.extend_from_slice(&word_from_usize(WORD));
        out.extend_from_slice(&word_from_usize(3 * WORD));
        out.extend_from_slice(&sig.salt);
        out.extend_from_slice(&sig.expiry.to_be_bytes());
        // Tail: the dynamic `bytes`.
        out.extend_from_slice(&word_from_usize(sig.signature.len()));
        out.extend_from_slice(&sig.signature);
        out.resize(out.len() + padded_len - sig.signature.len(), 0);
        out
    }
}

fn word_from_usize(value: usize) -> [u8; WORD] {
    U256::from(value as u64).to_be_bytes()
}
