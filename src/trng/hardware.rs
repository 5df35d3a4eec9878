//! Hardware TRNG abstraction.
//!
//! The peripheral samples two ring oscillators and returns at most one
//! 32-bit word per request. Each request names both oscillator feedback
//! polynomials and the number of bits to sample; only the low `bit_width`
//! bits of the returned word carry entropy.

use thiserror::Error;

/// Feedback polynomial for the Galois ring oscillator.
pub const GARO_POLYNOMIAL: u32 = 0x6C74_0B8D;

/// Feedback polynomial for the Fibonacci ring oscillator.
pub const FIRO_POLYNOMIAL: u32 = 0x52D2_46E1;

/// Widest sample a single request can return.
pub const MAX_WORD_BITS: u32 = 32;

/// Errors reported by the TRNG peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrngFault {
    #[error("invalid sample width: {0} bits (must be 1-32)")]
    InvalidBitWidth(u32),
    #[error("oscillator feedback polynomial must be non-zero")]
    InvalidPolynomial,
    #[error("peripheral reported status {0:#010x}")]
    Status(u32),
    #[error("entropy device unavailable: {0}")]
    Unavailable(String),
}

/// Trait for TRNG peripherals.
///
/// This abstraction allows swapping the on-chip generator for a
/// simulated or deterministic source in tests.
pub trait TrngHardware {
    /// Samples `bit_width` bits from the oscillators configured by
    /// `garo` and `firo`.
    ///
    /// The result occupies the low `bit_width` bits of the returned word;
    /// the remaining high bits are zero.
    fn request_word(&mut self, garo: u32, firo: u32, bit_width: u32) -> Result<u32, TrngFault>;
}

impl<T: TrngHardware + ?Sized> TrngHardware for Box<T> {
    fn request_word(&mut self, garo: u32, firo: u32, bit_width: u32) -> Result<u32, TrngFault> {
        (**self).request_word(garo, firo, bit_width)
    }
}

impl<T: TrngHardware + ?Sized> TrngHardware for &mut T {
    fn request_word(&mut self, garo: u32, firo: u32, bit_width: u32) -> Result<u32, TrngFault> {
        (**self).request_word(garo, firo, bit_width)
    }
}

/// Rejects requests the peripheral would refuse.
pub(crate) fn check_request(garo: u32, firo: u32, bit_width: u32) -> Result<(), TrngFault> {
    if garo == 0 || firo == 0 {
        return Err(TrngFault::InvalidPolynomial);
    }
    if bit_width == 0 || bit_width > MAX_WORD_BITS {
        return Err(TrngFault::InvalidBitWidth(bit_width));
    }
    Ok(())
}

/// Keeps only the low `bit_width` bits of `word`.
#[inline]
pub(crate) fn mask_word(word: u32, bit_width: u32) -> u32 {
    if bit_width >= MAX_WORD_BITS {
        word
    } else {
        word & ((1u32 << bit_width) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_word_widths() {
        assert_eq!(mask_word(0xDEAD_BEEF, 32), 0xDEAD_BEEF);
        assert_eq!(mask_word(0xDEAD_BEEF, 24), 0x00AD_BEEF);
        assert_eq!(mask_word(0xDEAD_BEEF, 16), 0x0000_BEEF);
        assert_eq!(mask_word(0xDEAD_BEEF, 8), 0x0000_00EF);
    }

    #[test]
    fn test_request_validation() {
        assert!(check_request(GARO_POLYNOMIAL, FIRO_POLYNOMIAL, 32).is_ok());
        assert!(check_request(GARO_POLYNOMIAL, FIRO_POLYNOMIAL, 8).is_ok());
        assert_eq!(
            check_request(GARO_POLYNOMIAL, FIRO_POLYNOMIAL, 0),
            Err(TrngFault::InvalidBitWidth(0))
        );
        assert_eq!(
            check_request(GARO_POLYNOMIAL, FIRO_POLYNOMIAL, 33),
            Err(TrngFault::InvalidBitWidth(33))
        );
        assert_eq!(
            check_request(0, FIRO_POLYNOMIAL, 32),
            Err(TrngFault::InvalidPolynomial)
        );
    }
}
