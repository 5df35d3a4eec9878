//! Entropy delivery on top of the TRNG peripheral.
//!
//! This module assembles fixed-width hardware samples into byte buffers
//! of any length, runs continuous health tests on the raw words, and
//! exposes the result as a `rand_core` generator.

mod health;
mod source;

pub use health::{HealthViolation, RepetitionCountTest};
pub use source::{EntropyError, EntropySource, EntropyStats, WORD_BYTES};
