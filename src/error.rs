use std::fmt;

use thiserror::Error;

/// Argon2 tuning parameter named by [`KdfError::InvalidParameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    TimeCost,
    MemoryCost,
    Parallelism,
    HashLen,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Param::TimeCost => "time cost",
            Param::MemoryCost => "memory cost",
            Param::Parallelism => "parallelism",
            Param::HashLen => "hash length",
        };
        f.write_str(name)
    }
}

/// Errors returned by salt and key derivation.
///
/// Messages never carry password, key or salt key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KdfError {
    /// Empty salt seed, or a password the primitive cannot accept.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Salt length outside the range Argon2 accepts (8 bytes minimum).
    #[error("invalid salt: {len} bytes, at least 8 required")]
    InvalidSalt { len: usize },

    /// One of the Argon2 parameters is out of bounds.
    #[error("invalid argon2 parameter: {0}")]
    InvalidParameter(Param),

    /// The host could not allocate the Argon2 working memory.
    #[error("unable to allocate {mem_cost_kib} KiB of argon2 working memory")]
    ResourceExhausted { mem_cost_kib: u32 },

    /// The HMAC key for salt derivation is malformed or too short.
    #[error("invalid salt key: {0}")]
    InvalidSaltKey(&'static str),

    #[error("OS random generator unavailable")]
    Rng,

    /// Unexpected failure reported by the Argon2 primitive.
    #[error("argon2 key derivation failed: {0}")]
    Primitive(String),
}

impl KdfError {
    /// `true` for caller mistakes: bad seeds, salts, parameters or keys.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            KdfError::InvalidInput(_)
                | KdfError::InvalidSalt { .. }
                | KdfError::InvalidParameter(_)
                | KdfError::InvalidSaltKey(_)
        )
    }

    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, KdfError::ResourceExhausted { .. })
    }
}

impl From<argon2::Error> for KdfError {
    fn from(err: argon2::Error) -> Self {
        use argon2::Error as E;

        match err {
            E::SaltTooShort | E::SaltTooLong => KdfError::InvalidSalt { len: 0 },
            E::TimeTooSmall => KdfError::InvalidParameter(Param::TimeCost),
            E::MemoryTooLittle | E::MemoryTooMuch => KdfError::InvalidParameter(Param::MemoryCost),
            E::ThreadsTooFew | E::ThreadsTooMany => KdfError::InvalidParameter(Param::Parallelism),
            E::OutputTooShort | E::OutputTooLong => KdfError::InvalidParameter(Param::HashLen),
            E::PwdTooLong => KdfError::InvalidInput("password too long"),
            other => KdfError::Primitive(other.to_string()),
        }
    }
}
