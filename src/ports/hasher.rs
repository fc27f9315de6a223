//! Credential hashing.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{MarketError, Result};

/// Hashes and verifies passwords for the identity service.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String>;
    fn compare(&self, digest: &str, plain: &str) -> bool;
}

const SALT_LEN: usize = 16;

/// Salted SHA-256, stored as `hex(salt)$hex(digest)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    fn digest(salt: &[u8], plain: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(plain.as_bytes());
        hasher.finalize().to_vec()
    }
}

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, plain: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng()
            .try_fill_bytes(&mut salt)
            .map_err(|e| MarketError::Credential(e.to_string()))?;
        let digest = Self::digest(&salt, plain);
        Ok(format!("{}${}", hex::encode(salt), hex::encode(digest)))
    }

    fn compare(&self, digest: &str, plain: &str) -> bool {
        let Some((salt_hex, expected_hex)) = digest.split_once('$') else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(expected_hex)) else {
            return false;
        };
        let actual = Self::digest(&salt, plain);
        (actual.len().ct_eq(&expected.len()) & actual.as_slice().ct_eq(&expected)).into()
    }
}
