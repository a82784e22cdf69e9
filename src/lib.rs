//! Password-based key derivation with salt normalization.
//!
//! A caller-supplied salt seed (a user name, an account ID) is first mapped
//! onto a uniform 32-byte salt with HMAC-SHA256 under a secret [`SaltKey`].
//! The password and salt then go through Argon2id.
//!
//! ```no_run
//! use saltkdf::{derive_key, randomize_salt};
//!
//! let salt = randomize_salt(b"User-ID-123")?;
//! let key = derive_key(b"your_secure_password", salt.as_bytes(), 5, 65536, 4, 32)?;
//! assert_eq!(key.len(), 32);
//! # Ok::<(), saltkdf::KdfError>(())
//! ```

mod crypto;
mod error;

pub use crate::crypto::{
    DerivedKey, DerivedSalt, KdfParams, KeyDeriver, KeyPipeline, SaltDeriver, SaltKey, generate_seed,
};
pub use crate::crypto::{MIN_SALT_LEN, SALT_LEN, SEED_LEN};
pub use crate::error::{KdfError, Param};

/// Environment variable holding the hex-encoded salt key.
pub const SALT_KEY_ENV: &str = "SALTKDF_SALT_KEY";

/// Normalizes `seed` into a 32-byte salt using the embedded salt key.
///
/// Use [`SaltDeriver::new`] with a configured [`SaltKey`] in production.
pub fn randomize_salt(seed: &[u8]) -> Result<DerivedSalt, KdfError> {
    SaltDeriver::default().derive(seed)
}

/// Derives a `hash_len`-byte Argon2id key.
///
/// The salt is checked before the parameters, and the parameters in the
/// order time cost, memory cost, parallelism, hash length.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    time_cost: u32,
    mem_cost_kib: u32,
    parallelism: u32,
    hash_len: usize,
) -> Result<DerivedKey, KdfError> {
    let params = KdfParams::from_parts(time_cost, mem_cost_kib, parallelism, hash_len);
    KeyDeriver::new(params).derive(password, salt)
}
