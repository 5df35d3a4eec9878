//! Fixed-capacity signature buffers.
//!
//! The scheme writes into a buffer sized for the level's maximum and
//! reports how many bytes it produced. [`SignatureBuffer::finish`] binds
//! the two together so the written length can never exceed the capacity
//! or drift from the bytes actually returned.

use super::level::SecurityLevel;
use super::scheme::SchemeError;

/// Caller-allocated output buffer for signing.
#[derive(Clone)]
pub struct SignatureBuffer {
    bytes: Vec<u8>,
}

impl SignatureBuffer {
    /// Allocates a buffer large enough for any signature at `level`.
    pub fn for_level(level: SecurityLevel) -> Self {
        Self::with_capacity(level.max_signature_len())
    }

    /// Allocates a zeroed buffer of exactly `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0u8; capacity],
        }
    }

    /// Returns the buffer capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the writable region.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Seals the buffer into a signature of `written` bytes.
    pub fn finish(self, level: SecurityLevel, written: usize) -> Result<Signature, SchemeError> {
        let limit = self.capacity().min(level.max_signature_len());
        if written > limit {
            return Err(SchemeError::SignatureOverrun {
                written,
                capacity: limit,
            });
        }
        Ok(Signature {
            level,
            bytes: self.bytes,
            len: written,
        })
    }
}

impl std::fmt::Debug for SignatureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureBuffer")
            .field("capacity", &self.bytes.len())
            .finish()
    }
}

/// A produced signature and its actual length.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    level: SecurityLevel,
    bytes: Vec<u8>,
    len: usize,
}

impl Signature {
    /// Wraps externally supplied signature bytes.
    ///
    /// Rejects input longer than the maximum for `level`. Shorter input
    /// is accepted here and left for verification to judge.
    pub fn from_bytes(level: SecurityLevel, bytes: &[u8]) -> Result<Self, SchemeError> {
        let mut buffer = SignatureBuffer::with_capacity(bytes.len());
        buffer.as_mut_slice().copy_from_slice(bytes);
        buffer.finish(level, bytes.len())
    }

    /// Returns the written signature bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Returns the number of bytes written by the signer.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no bytes were written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum length for this signature's level.
    #[inline]
    pub fn max_len(&self) -> usize {
        self.level.max_signature_len()
    }

    /// Returns the level the signature was produced at.
    #[inline]
    pub fn level(&self) -> SecurityLevel {
        self.level
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signature")
            .field("level", &self.level.number())
            .field("len", &self.len)
            .field("max_len", &self.max_len())
            .finish()
    }
}
