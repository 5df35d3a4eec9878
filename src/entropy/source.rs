//! Word-oriented entropy source.
//!
//! Turns the TRNG's one-word-per-request interface into arbitrary-length
//! byte output. Full 4-byte words are requested while at least four bytes
//! remain; a 1-3 byte tail is filled by a single request sized to exactly
//! the remaining bit width.
//!
//! # Failure model
//!
//! The first hardware fault ends the call. The fault is latched: every
//! later fill fails with [`EntropyError::Latched`] until the source is
//! dropped, so a caller can never silently continue on a faulted
//! generator. Health test trips are latched the same way.

use super::health::{HealthViolation, RepetitionCountTest};
use crate::config::{HealthConfig, TrngConfig};
use crate::trng::{TrngFault, TrngHardware, MAX_WORD_BITS};
use rand_core::{CryptoRng, RngCore};
use thiserror::Error;

/// Bytes produced by one full-width hardware request.
pub const WORD_BYTES: usize = (MAX_WORD_BITS / 8) as usize;

/// Errors that can occur while filling a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntropyError {
    #[error("hardware entropy failure at byte offset {offset}: {fault}")]
    Hardware { fault: TrngFault, offset: usize },
    #[error("entropy health test failed: {0}")]
    HealthTest(#[from] HealthViolation),
    #[error("requested {length} bytes but destination holds only {capacity}")]
    BufferTooSmall { length: usize, capacity: usize },
    #[error("entropy source disabled after an earlier failure")]
    Latched,
}

/// Running counters for an entropy source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntropyStats {
    /// Hardware requests issued, including failed ones.
    pub words_requested: u64,
    /// Bytes delivered by successful fills.
    pub bytes_delivered: u64,
    /// Hardware requests that returned a fault.
    pub hardware_faults: u64,
    /// Health test trips.
    pub health_failures: u64,
}

/// Entropy source over a TRNG peripheral.
///
/// Implements [`RngCore`] and [`CryptoRng`] so it can be handed directly
/// to the signature scheme as its randomness source.
pub struct EntropySource<H> {
    hardware: H,
    config: TrngConfig,
    health: RepetitionCountTest,
    startup_probe_bytes: usize,
    fault: Option<EntropyError>,
    instantiated: bool,
    stats: EntropyStats,
}

impl<H: TrngHardware> EntropySource<H> {
    /// Creates a source with the default oscillator and health settings.
    pub fn new(hardware: H) -> Self {
        Self::with_config(hardware, TrngConfig::default(), &HealthConfig::default())
    }

    /// Creates a source with explicit configuration.
    pub fn with_config(hardware: H, config: TrngConfig, health: &HealthConfig) -> Self {
        Self {
            hardware,
            config,
            health: RepetitionCountTest::new(health.repetition_cutoff),
            startup_probe_bytes: health.startup_probe_bytes,
            fault: None,
            instantiated: false,
            stats: EntropyStats::default(),
        }
    }

    /// Brings the entropy context up.
    ///
    /// Draws and discards a startup probe through [`fill`](Self::fill),
    /// which exercises the peripheral and the health test before any
    /// output is handed to a caller. Calling this again on an
    /// instantiated source is a no-op.
    pub fn instantiate(&mut self) -> Result<(), EntropyError> {
        if self.instantiated {
            return Ok(());
        }

        let mut probe = vec![0u8; self.startup_probe_bytes];
        let length = probe.len();
        self.fill(&mut probe, length)?;
        self.instantiated = true;

        tracing::debug!(probe_bytes = length, "Entropy context instantiated");
        Ok(())
    }

    /// Fills `destination[..length]` with fresh hardware entropy.
    ///
    /// On error the contents of `destination` are unspecified and must
    /// not be used.
    pub fn fill(&mut self, destination: &mut [u8], length: usize) -> Result<(), EntropyError> {
        if self.fault.is_some() {
            return Err(EntropyError::Latched);
        }
        if length > destination.len() {
            return Err(EntropyError::BufferTooSmall {
                length,
                capacity: destination.len(),
            });
        }

        let mut words = destination[..length].chunks_exact_mut(WORD_BYTES);
        for (index, chunk) in (&mut words).enumerate() {
            let word = self.request(MAX_WORD_BITS, index * WORD_BYTES)?;
            if let Err(violation) = self.health.observe(word) {
                return Err(self.latch_health(violation));
            }
            chunk.copy_from_slice(&word.to_le_bytes());
        }

        let tail = words.into_remainder();
        if !tail.is_empty() {
            let bits = (tail.len() * 8) as u32;
            let word = self.request(bits, length - tail.len())?;
            tail.copy_from_slice(&word.to_le_bytes()[..tail.len()]);
        }

        self.stats.bytes_delivered += length as u64;
        tracing::debug!(
            bytes = length,
            words_requested = self.stats.words_requested,
            "Entropy delivered"
        );
        Ok(())
    }

    /// Issues one hardware request, latching the first fault.
    fn request(&mut self, bit_width: u32, offset: usize) -> Result<u32, EntropyError> {
        self.stats.words_requested += 1;

        match self.hardware.request_word(
            self.config.garo_polynomial,
            self.config.firo_polynomial,
            bit_width,
        ) {
            Ok(word) => {
                tracing::trace!(bit_width, offset, "TRNG word received");
                Ok(word)
            }
            Err(fault) => {
                self.stats.hardware_faults += 1;
                let error = EntropyError::Hardware { fault, offset };
                tracing::warn!(error = %error, "TRNG request failed");
                self.fault = Some(error.clone());
                Err(error)
            }
        }
    }

    fn latch_health(&mut self, violation: HealthViolation) -> EntropyError {
        self.stats.health_failures += 1;
        let error = EntropyError::HealthTest(violation);
        tracing::warn!(error = %error, "Entropy source failed health test");
        self.fault = Some(error.clone());
        error
    }

    /// Returns the latched failure, if any.
    pub fn fault(&self) -> Option<&EntropyError> {
        self.fault.as_ref()
    }

    /// Returns true if the startup probe has passed.
    pub fn is_instantiated(&self) -> bool {
        self.instantiated
    }

    /// Returns the running counters.
    pub fn stats(&self) -> EntropyStats {
        self.stats
    }

    /// Returns the underlying peripheral.
    pub fn hardware(&self) -> &H {
        &self.hardware
    }
}

impl<H: TrngHardware> RngCore for EntropySource<H> {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    /// Panics on hardware failure, like `OsRng`. Use
    /// [`try_fill_bytes`](RngCore::try_fill_bytes) to handle it.
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(e) = self.try_fill_bytes(dest) {
            panic!("hardware entropy failure: {e}");
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        let length = dest.len();
        self.fill(dest, length).map_err(rand_core::Error::new)
    }
}

impl<H: TrngHardware> CryptoRng for EntropySource<H> {}

impl<H> std::fmt::Debug for EntropySource<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropySource")
            .field("instantiated", &self.instantiated)
            .field("fault", &self.fault)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
