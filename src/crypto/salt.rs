use std::fmt;

use getrandom::fill;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{MIN_SALT_KEY_LEN, SALT_LEN, SEED_LEN};
use crate::error::KdfError;

type HmacSha256 = Hmac<Sha256>;

/// Compiled-in salt key. Shared by every deployment that does not configure
/// its own, so it only keeps salts unpredictable to parties who never saw
/// this source.
const EMBEDDED_SALT_KEY: [u8; MIN_SALT_KEY_LEN] = [
    0x6b, 0x1f, 0xd2, 0x3a, 0x90, 0x4e, 0xc7, 0x58, 0x21, 0xa4, 0x0d, 0xe9, 0x7c, 0x33, 0xb6, 0x15,
    0xf0, 0x82, 0x4b, 0xcd, 0x19, 0x6e, 0xa7, 0x02, 0xd8, 0x5f, 0x94, 0x3e, 0xbb, 0x60, 0x0a, 0xe1,
];

/// Secret key for the salt PRF.
#[derive(Clone)]
pub struct SaltKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for SaltKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltKey")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl SaltKey {
    /// Wraps raw key material. Keys shorter than 32 bytes are rejected.
    pub fn new(bytes: Vec<u8>) -> Result<Self, KdfError> {
        let bytes = Zeroizing::new(bytes);
        if bytes.len() < MIN_SALT_KEY_LEN {
            return Err(KdfError::InvalidSaltKey("key must be at least 32 bytes"));
        }
        Ok(Self { bytes })
    }

    /// Decodes a hex-encoded key, e.g. 64 hex chars for 32 bytes.
    pub fn from_hex(hex_key: &str) -> Result<Self, KdfError> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|_| KdfError::InvalidSaltKey("key is not valid hex"))?;
        Self::new(bytes)
    }

    /// Reads a hex key from the environment variable `var`.
    ///
    /// Returns `Ok(None)` when the variable is unset or empty.
    pub fn from_env(var: &str) -> Result<Option<Self>, KdfError> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => {
                let value = Zeroizing::new(value);
                Self::from_hex(&value).map(Some)
            }
            Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => {
                Err(KdfError::InvalidSaltKey("key is not valid unicode"))
            }
        }
    }

    /// The compiled-in default key.
    pub fn embedded() -> Self {
        Self {
            bytes: Zeroizing::new(EMBEDDED_SALT_KEY.to_vec()),
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.bytes.as_slice() == EMBEDDED_SALT_KEY.as_slice()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A 32-byte salt produced by [`SaltDeriver::derive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivedSalt([u8; SALT_LEN]);

impl DerivedSalt {
    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for DerivedSalt {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Normalizes low-entropy salt seeds (user names, IDs) into uniform 32-byte
/// salts using HMAC-SHA256 under a secret [`SaltKey`].
#[derive(Debug, Clone)]
pub struct SaltDeriver {
    key: SaltKey,
}

impl Default for SaltDeriver {
    fn default() -> Self {
        Self::new(SaltKey::embedded())
    }
}

impl SaltDeriver {
    pub fn new(key: SaltKey) -> Self {
        Self { key }
    }

    /// Derives the salt for `seed`. Same key and seed always give the same salt.
    ///
    /// # Errors
    ///
    /// Returns [`KdfError::InvalidInput`] if `seed` is empty.
    pub fn derive(&self, seed: &[u8]) -> Result<DerivedSalt, KdfError> {
        if seed.is_empty() {
            return Err(KdfError::InvalidInput("salt seed must not be empty"));
        }

        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(self.key.as_bytes())
            .map_err(|_| KdfError::InvalidSaltKey("rejected by HMAC"))?;
        mac.update(seed);

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&mac.finalize().into_bytes());

        tracing::debug!(seed_len = seed.len(), "derived salt");
        Ok(DerivedSalt(salt))
    }
}

/// Generates a random salt seed for callers without a natural identifier.
pub fn generate_seed() -> Result<[u8; SEED_LEN], KdfError> {
    let mut seed = [0u8; SEED_LEN];
    fill(&mut seed).map_err(|_| KdfError::Rng)?;
    Ok(seed)
}
