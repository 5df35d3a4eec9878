//! Security levels and their size bounds.

use serde::{Deserialize, Serialize};

pub(crate) const ML_DSA_44_PK_LEN: usize = 1312;
pub(crate) const ML_DSA_44_SK_LEN: usize = 2560;
pub(crate) const ML_DSA_44_SIG_LEN: usize = 2420;

pub(crate) const ML_DSA_65_PK_LEN: usize = 1952;
pub(crate) const ML_DSA_65_SK_LEN: usize = 4032;
pub(crate) const ML_DSA_65_SIG_LEN: usize = 3309;

pub(crate) const ML_DSA_87_PK_LEN: usize = 2592;
pub(crate) const ML_DSA_87_SK_LEN: usize = 4896;
pub(crate) const ML_DSA_87_SIG_LEN: usize = 4627;

/// Signature scheme security level.
///
/// Serialized as the bare level number (`2`, `3` or `5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SecurityLevel {
    /// NIST level 2 (ML-DSA-44).
    Level2,
    /// NIST level 3 (ML-DSA-65).
    Level3,
    /// NIST level 5 (ML-DSA-87).
    Level5,
}

impl SecurityLevel {
    /// All supported levels, weakest first.
    pub const ALL: [SecurityLevel; 3] = [Self::Level2, Self::Level3, Self::Level5];

    /// Returns the numeric level.
    pub const fn number(self) -> u8 {
        match self {
            Self::Level2 => 2,
            Self::Level3 => 3,
            Self::Level5 => 5,
        }
    }

    /// Returns the upper bound on signature length in bytes.
    pub const fn max_signature_len(self) -> usize {
        match self {
            Self::Level2 => ML_DSA_44_SIG_LEN,
            Self::Level3 => ML_DSA_65_SIG_LEN,
            Self::Level5 => ML_DSA_87_SIG_LEN,
        }
    }

    /// Returns the encoded public key length in bytes.
    pub const fn public_key_len(self) -> usize {
        match self {
            Self::Level2 => ML_DSA_44_PK_LEN,
            Self::Level3 => ML_DSA_65_PK_LEN,
            Self::Level5 => ML_DSA_87_PK_LEN,
        }
    }

    /// Returns the encoded secret key length in bytes.
    pub const fn secret_key_len(self) -> usize {
        match self {
            Self::Level2 => ML_DSA_44_SK_LEN,
            Self::Level3 => ML_DSA_65_SK_LEN,
            Self::Level5 => ML_DSA_87_SK_LEN,
        }
    }

    /// Returns the parameter set name.
    pub const fn algorithm(self) -> &'static str {
        match self {
            Self::Level2 => "ML-DSA-44",
            Self::Level3 => "ML-DSA-65",
            Self::Level5 => "ML-DSA-87",
        }
    }
}

/// Error for a level outside {2, 3, 5}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported security level {0} (expected 2, 3 or 5)")]
pub struct UnsupportedLevel(pub u8);

impl TryFrom<u8> for SecurityLevel {
    type Error = UnsupportedLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Level2),
            3 => Ok(Self::Level3),
            5 => Ok(Self::Level5),
            other => Err(UnsupportedLevel(other)),
        }
    }
}

impl From<SecurityLevel> for u8 {
    fn from(level: SecurityLevel) -> Self {
        level.number()
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level {} ({})", self.number(), self.algorithm())
    }
}
