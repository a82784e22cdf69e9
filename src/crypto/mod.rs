//! Cryptographic pipeline: salt normalization and Argon2id key derivation.
//!
//! [`SaltDeriver`] maps an arbitrary seed onto a 32-byte salt with
//! HMAC-SHA256, [`KeyDeriver`] runs Argon2id over the password and salt,
//! and [`KeyPipeline`] composes the two.

pub mod kdf;
pub mod pipeline;
pub mod salt;

pub use kdf::{DerivedKey, KdfParams, KeyDeriver};
pub use pipeline::KeyPipeline;
pub use salt::{DerivedSalt, SaltDeriver, SaltKey, generate_seed};

/// Length of a derived salt (32 bytes, one HMAC-SHA256 output).
pub const SALT_LEN: usize = 32;
/// Minimum salt length accepted by Argon2.
pub const MIN_SALT_LEN: usize = 8;
/// Maximum salt length accepted by Argon2.
pub const MAX_SALT_LEN: usize = 0xFFFF_FFFF;
/// Maximum password length accepted by Argon2.
pub const MAX_PASSWORD_LEN: usize = 0xFFFF_FFFF;
/// Minimum length of the salt derivation key (256 bits).
pub const MIN_SALT_KEY_LEN: usize = 32;
/// Length of a generated random seed.
pub const SEED_LEN: usize = 16;
