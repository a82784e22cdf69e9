use super::kdf::{DerivedKey, KdfParams, KeyDeriver};
use super::salt::{DerivedSalt, SaltDeriver};
use crate::error::KdfError;

/// Seed to salt to key, in one call.
#[derive(Debug, Clone, Default)]
pub struct KeyPipeline {
    salt: SaltDeriver,
    kdf: KeyDeriver,
}

impl KeyPipeline {
    pub fn new(salt: SaltDeriver, params: KdfParams) -> Self {
        Self {
            salt,
            kdf: KeyDeriver::new(params),
        }
    }

    pub fn params(&self) -> &KdfParams {
        self.kdf.params()
    }

    /// Normalizes `seed` into a salt, then derives the key for `password`.
    pub fn derive(
        &self,
        password: &[u8],
        seed: &[u8],
    ) -> Result<(DerivedSalt, DerivedKey), KdfError> {
        let salt = self.salt.derive(seed)?;
        let key = self.kdf.derive(password, salt.as_bytes())?;
        Ok((salt, key))
    }
}
