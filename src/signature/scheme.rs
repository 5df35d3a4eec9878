//! Signature scheme abstraction.
//!
//! The lattice arithmetic lives behind this trait. The lifecycle only
//! drives the calls in order and inspects their results, so a
//! deterministic double can stand in for the real backend in tests.

use super::buffer::SignatureBuffer;
use super::key::Key;
use super::level::SecurityLevel;
use crate::entropy::EntropyError;
use rand_core::CryptoRngCore;
use thiserror::Error;

/// Errors reported across the scheme boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemeError {
    #[error("security level {0} not supported by this scheme")]
    UnsupportedLevel(SecurityLevel),
    #[error("key is not bound to a security level")]
    LevelNotSet,
    #[error("key has no keypair material")]
    KeyNotPopulated,
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("{what} has wrong length: expected {expected} bytes, got {got}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("signature buffer too small: capacity {capacity} bytes, level needs {required}")]
    BufferTooSmall { capacity: usize, required: usize },
    #[error("signer reported {written} bytes into a {capacity}-byte buffer")]
    SignatureOverrun { written: usize, capacity: usize },
    #[error("signature is for {signature}, key is {key}")]
    LevelMismatch {
        signature: SecurityLevel,
        key: SecurityLevel,
    },
    #[error("entropy source failed: {0}")]
    Entropy(#[from] EntropyError),
    #[error("scheme backend rejected the operation: {0}")]
    Backend(&'static str),
}

/// Trait for signature scheme backends.
pub trait SignatureScheme {
    /// Returns true if the backend implements `level`.
    fn supports(&self, level: SecurityLevel) -> bool;

    /// Creates an empty key object.
    fn init_key(&self) -> Result<Key, SchemeError>;

    /// Binds `key` to `level`.
    fn set_level(&self, key: &mut Key, level: SecurityLevel) -> Result<(), SchemeError>;

    /// Generates keypair material into `key`, drawing randomness from `rng`.
    fn make_keypair<R: CryptoRngCore>(&self, key: &mut Key, rng: &mut R)
        -> Result<(), SchemeError>;

    /// Signs `message` into `out` and returns the number of bytes written.
    ///
    /// `out` must be pre-sized to at least the level's maximum signature
    /// length.
    fn sign<R: CryptoRngCore>(
        &self,
        message: &[u8],
        key: &Key,
        rng: &mut R,
        out: &mut SignatureBuffer,
    ) -> Result<usize, SchemeError>;

    /// Checks `signature` over `message` against `key`.
    ///
    /// `Ok(false)` means the check ran and rejected the signature; an
    /// error means it could not be carried out.
    fn verify(&self, signature: &[u8], message: &[u8], key: &Key) -> Result<bool, SchemeError>;
}
