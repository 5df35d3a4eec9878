//! Software stand-ins for the TRNG peripheral.
//!
//! `SimulatedTrng` models the ring oscillators with a ChaCha20 stream
//! keyed from OS entropy and the configured feedback polynomials.
//! `OsTrng` forwards each request to the operating system generator.

use super::hardware::{check_request, mask_word, TrngFault, TrngHardware};
use crate::config::TrngConfig;
use blake3::Hasher;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};

/// Domain separator for deriving the simulated oscillator stream.
const OSCILLATOR_DOMAIN: &[u8] = b"mldsa-trng-simulated-oscillators-v1";

/// Simulated oscillator pair backed by ChaCha20.
///
/// The stream key is `BLAKE3(domain || garo || firo || seed)`, so two
/// sources configured with different polynomials never share output
/// even when seeded identically.
pub struct SimulatedTrng {
    inner: ChaCha20Rng,
    requests: u64,
}

impl SimulatedTrng {
    /// Creates a simulated source seeded from the OS entropy source.
    pub fn from_os_entropy(config: &TrngConfig) -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::from_seed(seed, config)
    }

    /// Creates a simulated source from a known seed.
    pub fn from_seed(seed: [u8; 32], config: &TrngConfig) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(OSCILLATOR_DOMAIN);
        hasher.update(&config.garo_polynomial.to_le_bytes());
        hasher.update(&config.firo_polynomial.to_le_bytes());
        hasher.update(&seed);

        Self {
            inner: ChaCha20Rng::from_seed(*hasher.finalize().as_bytes()),
            requests: 0,
        }
    }

    /// Returns the number of requests served.
    pub fn request_count(&self) -> u64 {
        self.requests
    }
}

impl TrngHardware for SimulatedTrng {
    fn request_word(&mut self, garo: u32, firo: u32, bit_width: u32) -> Result<u32, TrngFault> {
        check_request(garo, firo, bit_width)?;
        self.requests += 1;
        Ok(mask_word(self.inner.next_u32(), bit_width))
    }
}

impl std::fmt::Debug for SimulatedTrng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedTrng")
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

/// Word source backed by the operating system generator.
#[derive(Debug, Default)]
pub struct OsTrng;

impl OsTrng {
    pub fn new() -> Self {
        Self
    }
}

impl TrngHardware for OsTrng {
    fn request_word(&mut self, garo: u32, firo: u32, bit_width: u32) -> Result<u32, TrngFault> {
        check_request(garo, firo, bit_width)?;
        let mut word = [0u8; 4];
        OsRng
            .try_fill_bytes(&mut word)
            .map_err(|e| TrngFault::Unavailable(e.to_string()))?;
        Ok(mask_word(u32::from_le_bytes(word), bit_width))
    }
}
