//! Lattice signature pipeline.
//!
//! This module binds a [`SignatureScheme`] backend to an entropy source
//! and drives one key through generation, signing and verification:
//!
//! ```text
//! EntropySource ──▶ make_keypair ──▶ sign ──▶ verify (repeatable)
//! ```
//!
//! [`MlDsa`] is the production backend. Signatures are produced into
//! buffers sized for the level's maximum and carry their actual length.

mod buffer;
mod key;
mod level;
mod lifecycle;
mod mldsa;
mod scheme;

pub use buffer::{Signature, SignatureBuffer};
pub use key::Key;
pub use level::{SecurityLevel, UnsupportedLevel};
pub use lifecycle::{
    KeyPhase, LifecycleError, LifecycleState, SignatureLifecycle, VerificationOutcome,
};
pub use mldsa::MlDsa;
pub use scheme::{SchemeError, SignatureScheme};
