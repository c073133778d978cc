use crate::core::error::CredentialError;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;
use std::fmt;

/// An Argon2id hash in PHC string format.
///
/// The only ways to obtain one are [`CredentialStore::hash`] and loading
/// persisted state, so a plaintext password can never end up in this slot.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a PHC string read back from storage
    pub(crate) fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Hashes passwords on write and verifies them on read
#[derive(Clone, Debug)]
pub struct CredentialStore {
    params: Params,
}

impl CredentialStore {
    /// Build a store with explicit Argon2 cost parameters
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;

        Ok(Self { params })
    }

    /// One-way transform of `plaintext`, salted with 16 random bytes
    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, CredentialError> {
        let mut bytes = [0u8; 16];
        rand::rng().fill(&mut bytes);

        let salt = SaltString::encode_b64(&bytes)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        let phc = self
            .hasher()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?
            .to_string();

        Ok(PasswordHash(phc))
    }

    /// Returns false on mismatch and on a malformed stored hash, never an error
    pub fn verify(&self, plaintext: &str, hash: &PasswordHash) -> bool {
        // Cost parameters are read back from the PHC string itself
        password_hash::PasswordHash::new(hash.as_str())
            .map(|parsed| {
                Argon2::default()
                    .verify_password(plaintext.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}
