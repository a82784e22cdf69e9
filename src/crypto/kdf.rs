use std::fmt;

use argon2::{Algorithm, Argon2, Block, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::{MAX_PASSWORD_LEN, MAX_SALT_LEN, MIN_SALT_LEN};
use crate::error::{KdfError, Param};

/// Argon2id cost parameters and output length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    time_cost: u32,
    mem_cost_kib: u32,
    parallelism: u32,
    hash_len: usize,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            // passes over memory
            time_cost: 2,
            mem_cost_kib: 100 * 1024, // 100 MiB
            // lanes
            parallelism: 8,
            hash_len: 32,
        }
    }
}

impl KdfParams {
    /// Documented production floor; not enforced.
    pub const RECOMMENDED_MIN_TIME_COST: u32 = 3;
    pub const RECOMMENDED_MIN_MEM_COST_KIB: u32 = 64 * 1024;

    pub const MIN_MEM_COST_KIB: u32 = 8;
    pub const MAX_PARALLELISM: u32 = 0xFF_FFFF;
    pub const MIN_HASH_LEN: usize = 4;
    pub const MAX_HASH_LEN: usize = 0xFFFF_FFFF;

    pub fn new(
        time_cost: u32,
        mem_cost_kib: u32,
        parallelism: u32,
        hash_len: usize,
    ) -> Result<Self, KdfError> {
        let params = Self::from_parts(time_cost, mem_cost_kib, parallelism, hash_len);
        params.validate()?;
        Ok(params)
    }

    /// Builds params without validation; [`KeyDeriver::derive`] validates.
    pub(crate) fn from_parts(
        time_cost: u32,
        mem_cost_kib: u32,
        parallelism: u32,
        hash_len: usize,
    ) -> Self {
        Self {
            time_cost,
            mem_cost_kib,
            parallelism,
            hash_len,
        }
    }

    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    pub fn mem_cost_kib(&self) -> u32 {
        self.mem_cost_kib
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn hash_len(&self) -> usize {
        self.hash_len
    }

    /// Checks every bound, reporting the first violation in the order
    /// time cost, memory cost, parallelism, hash length.
    pub fn validate(&self) -> Result<(), KdfError> {
        if self.time_cost < 1 {
            return Err(KdfError::InvalidParameter(Param::TimeCost));
        }
        if u64::from(self.mem_cost_kib) < 8 * u64::from(self.parallelism) {
            return Err(KdfError::InvalidParameter(Param::MemoryCost));
        }
        if self.parallelism < 1 || self.parallelism > Self::MAX_PARALLELISM {
            return Err(KdfError::InvalidParameter(Param::Parallelism));
        }
        // implied by the lane floor once parallelism >= 1
        if self.mem_cost_kib < Self::MIN_MEM_COST_KIB {
            return Err(KdfError::InvalidParameter(Param::MemoryCost));
        }
        if self.hash_len < Self::MIN_HASH_LEN || self.hash_len > Self::MAX_HASH_LEN {
            return Err(KdfError::InvalidParameter(Param::HashLen));
        }
        Ok(())
    }

    pub fn meets_recommended_floor(&self) -> bool {
        self.time_cost >= Self::RECOMMENDED_MIN_TIME_COST
            && self.mem_cost_kib >= Self::RECOMMENDED_MIN_MEM_COST_KIB
    }

    fn to_argon2(self) -> Result<Params, KdfError> {
        Ok(Params::new(
            self.mem_cost_kib,
            self.time_cost,
            self.parallelism,
            Some(self.hash_len),
        )?)
    }
}

/// Key material returned by [`KeyDeriver::derive`]. Zeroed on drop.
pub struct DerivedKey(Zeroizing<Vec<u8>>);

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("len", &self.0.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.as_slice()))
    }
}

impl AsRef<[u8]> for DerivedKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Runs Argon2id (v0x13) with a fixed parameter set.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDeriver {
    params: KdfParams,
}

impl KeyDeriver {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Derives `hash_len` bytes from `password` and `salt`.
    ///
    /// All preconditions are checked before any memory is allocated.
    ///
    /// # Errors
    ///
    /// - [`KdfError::InvalidSalt`] if the salt is shorter than 8 bytes
    /// - [`KdfError::InvalidParameter`] if a parameter is out of bounds
    /// - [`KdfError::InvalidInput`] if the password is too long for Argon2
    /// - [`KdfError::ResourceExhausted`] if the working memory cannot be allocated
    pub fn derive(&self, password: &[u8], salt: &[u8]) -> Result<DerivedKey, KdfError> {
        if salt.len() < MIN_SALT_LEN || salt.len() > MAX_SALT_LEN {
            return Err(KdfError::InvalidSalt { len: salt.len() });
        }
        self.params.validate()?;
        if password.len() > MAX_PASSWORD_LEN {
            return Err(KdfError::InvalidInput("password too long"));
        }

        let params = self.params.to_argon2()?;
        let block_count = params.block_count();
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        tracing::debug!(
            time_cost = self.params.time_cost,
            mem_cost_kib = self.params.mem_cost_kib,
            parallelism = self.params.parallelism,
            hash_len = self.params.hash_len,
            "deriving argon2id key"
        );

        let mut blocks = self.allocate_blocks(block_count)?;
        let mut key = Zeroizing::new(Vec::new());
        if key.try_reserve_exact(self.params.hash_len).is_err() {
            blocks.zeroize();
            return Err(self.exhausted());
        }
        key.resize(self.params.hash_len, 0);

        let result = argon2.hash_password_into_with_memory(password, salt, &mut key, &mut blocks);
        blocks.zeroize();

        result.map_err(|e| match KdfError::from(e) {
            KdfError::InvalidSalt { .. } => KdfError::InvalidSalt { len: salt.len() },
            other => other,
        })?;

        Ok(DerivedKey(key))
    }

    fn allocate_blocks(&self, block_count: usize) -> Result<Vec<Block>, KdfError> {
        let mut blocks = Vec::new();
        blocks
            .try_reserve_exact(block_count)
            .map_err(|_| self.exhausted())?;
        blocks.resize(block_count, Block::default());
        Ok(blocks)
    }

    fn exhausted(&self) -> KdfError {
        tracing::warn!(
            mem_cost_kib = self.params.mem_cost_kib,
            "argon2 working memory allocation failed"
        );
        KdfError::ResourceExhausted {
            mem_cost_kib: self.params.mem_cost_kib,
        }
    }
}
