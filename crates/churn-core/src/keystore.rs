//! Password-encrypted operator key files.
//!
//! ```text
//! {
//!   "address": "0x…",                 (optional, informational)
//!   "public_key": "<hex>",
//!   "crypto": {
//!     "cipher": "aes-256-gcm",
//!     "kdf": "blake3",
//!     "salt": "<hex, 32 bytes>",
//!     "nonce": "<hex, 12 bytes>",
//!     "ciphertext": "<hex, secret ‖ tag>"
//!   }
//! }
//! ```
//!
//! The encryption key is `blake3::derive_key(KDF_CONTEXT, salt ‖ password)`.
//!
//! This KDF is a single fast hash. It does not resist offline brute force,
//! so a stolen key file is only as safe as its password is long and random.
//! Keep key files on access-controlled storage and use high-entropy
//! passwords.

use crate::error::{Error, Result};
use crate::keys::{KeyPair, PublicKey};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CIPHER: &str = "aes-256-gcm";
pub const KDF: &str = "blake3";
const KDF_CONTEXT: &str = "churn keystore 2024-01 operator key encryption";
const NONCE_LENGTH: usize = 12;
const KDF_SALT_LENGTH: usize = 32;

/// Cipher parameters of a keystore file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreCrypto {
    pub cipher: String,
    pub kdf: String,
    #[serde(with = "crate::hex_serde::bytes")]
    pub salt: Vec<u8>,
    #[serde(with = "crate::hex_serde::bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "crate::hex_serde::bytes")]
    pub ciphertext: Vec<u8>,
}

/// An encrypted key file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub public_key: PublicKey,
    pub crypto: KeystoreCrypto,
}

fn derive_key(salt: &[u8], password: &str) -> [u8; 32] {
    let mut material = Vec::with_capacity(salt.len() + password.len());
    material.extend_from_slice(salt);
    material.extend_from_slice(password.as_bytes());
    blake3::derive_key(KDF_CONTEXT, &material)
}

impl Keystore {
    /// Encrypt a key pair under `password`.
    pub fn encrypt(key_pair: &KeyPair, password: &str) -> Result<Self> {
        let mut salt = vec![0u8; KDF_SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);
        let mut nonce = vec![0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce);

        let cipher = Aes256Gcm::new_from_slice(&derive_key(&salt, password))
            .map_err(|e| Error::KeyLoad(format!("key init failed: {}", e)))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), key_pair.secret_bytes().as_slice())
            .map_err(|e| Error::KeyLoad(format!("encrypt failed: {}", e)))?;

        Ok(Self {
            address: None,
            public_key: key_pair.public_key(),
            crypto: KeystoreCrypto {
                cipher: CIPHER.to_string(),
                kdf: KDF.to_string(),
                salt,
                nonce,
                ciphertext,
            },
        })
    }

    /// Decrypt the key pair.
    pub fn decrypt(&self, password: &str) -> Result<KeyPair> {
        let crypto = &self.crypto;
        if crypto.cipher != CIPHER {
            return Err(Error::KeyLoad(format!("unsupported cipher {:?}", crypto.cipher)));
        }
        if crypto.kdf != KDF {
            return Err(Error::KeyLoad(format!("unsupported kdf {:?}", crypto.kdf)));
        }
        if crypto.nonce.len() != NONCE_LENGTH {
            return Err(Error::KeyLoad(format!(
                "nonce must be {} bytes, got {}",
                NONCE_LENGTH,
                crypto.nonce.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(&derive_key(&crypto.salt, password))
            .map_err(|e| Error::KeyLoad(format!("key init failed: {}", e)))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&crypto.nonce), crypto.ciphertext.as_slice())
            .map_err(|_| Error::Decryption)?;

        let secret: [u8; 32] = plaintext.as_slice().try_into().map_err(|_| {
            Error::KeyLoad(format!("decrypted secret has {} bytes, expected 32", plaintext.len()))
        })?;
        let key_pair = KeyPair::from_secret_bytes(&secret);
        if key_pair.public_key() != self.public_key {
            return Err(Error::KeyLoad(
                "decrypted key does not match the stored public key".to_string(),
            ));
        }
        Ok(key_pair)
    }

    /// Read a keystore file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| Error::KeyLoad(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_slice(&data)
            .map_err(|e| Error::KeyLoad(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Write the keystore as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read and decrypt in one step.
    pub fn load(path: &Path, password: &str) -> Result<KeyPair> {
        Self::read(path)?.decrypt(password)
    }
}
