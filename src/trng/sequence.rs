//! Deterministic TRNG stub for reproducible tests.

use super::hardware::{check_request, mask_word, TrngFault, TrngHardware};

/// Status code reported by an injected fault.
pub const INJECTED_FAULT_STATUS: u32 = 0x00C0_FFEE;

/// Increment used by [`SequenceTrng::new`] (golden-ratio constant).
const DEFAULT_STEP: u32 = 0x9E37_79B9;

/// Fixed-sequence TRNG stub.
///
/// Produces `start, start + step, start + 2*step, ...` (wrapping) and
/// records every requested bit width. Can be told to fail once a given
/// number of requests has been served.
#[derive(Debug, Clone)]
pub struct SequenceTrng {
    next: u32,
    step: u32,
    fail_after: Option<u64>,
    requests: u64,
    widths: Vec<u32>,
}

impl SequenceTrng {
    /// Creates a stub producing a non-repeating counter sequence.
    pub fn new(start: u32) -> Self {
        Self::with_step(start, DEFAULT_STEP)
    }

    /// Creates a stub advancing by `step` each request.
    pub fn with_step(start: u32, step: u32) -> Self {
        Self {
            next: start,
            step,
            fail_after: None,
            requests: 0,
            widths: Vec::new(),
        }
    }

    /// Creates a stuck source that returns the same word forever.
    pub fn constant(word: u32) -> Self {
        Self::with_step(word, 0)
    }

    /// Fails every request after the first `requests` have succeeded.
    pub fn failing_after(mut self, requests: u64) -> Self {
        self.fail_after = Some(requests);
        self
    }

    /// Returns the number of requests received, including failed ones.
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Returns the bit width of every request received, in order.
    pub fn requested_widths(&self) -> &[u32] {
        &self.widths
    }
}

impl TrngHardware for SequenceTrng {
    fn request_word(&mut self, garo: u32, firo: u32, bit_width: u32) -> Result<u32, TrngFault> {
        self.widths.push(bit_width);
        let served = self.requests;
        self.requests += 1;

        check_request(garo, firo, bit_width)?;
        if self.fail_after.is_some_and(|limit| served >= limit) {
            return Err(TrngFault::Status(INJECTED_FAULT_STATUS));
        }

        let word = self.next;
        self.next = self.next.wrapping_add(self.step);
        Ok(mask_word(word, bit_width))
    }
}
