//! TRNG peripheral access.
//!
//! This module provides the word-oriented hardware interface the entropy
//! source is built on, plus simulated and deterministic implementations
//! for hosts without the peripheral and for tests.

mod hardware;
mod sequence;
mod simulated;

pub use hardware::{TrngFault, TrngHardware, FIRO_POLYNOMIAL, GARO_POLYNOMIAL, MAX_WORD_BITS};
pub use sequence::{SequenceTrng, INJECTED_FAULT_STATUS};
pub use simulated::{OsTrng, SimulatedTrng};
