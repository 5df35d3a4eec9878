//! TRNG-backed ML-DSA Signature Pipeline
//!
//! Generates a lattice signature keypair from a word-oriented hardware
//! true random number generator, signs a message, and verifies the
//! result.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! trng → entropy → signature (keygen → sign → verify)
//!          ↓
//!   health testing
//! ```
//!
//! # Design Principles
//!
//! - **Fail-closed**: The first hardware fault halts the pipeline and
//!   disables the entropy source
//! - **Exact sizing**: Signatures are written into buffers sized for the
//!   level maximum and carry their actual length
//! - **Uses standard primitives**: ML-DSA (FIPS 204) for signatures
//!
//! # Example
//!
//! ```no_run
//! use mldsa_trng::{
//!     entropy::EntropySource,
//!     signature::{MlDsa, SecurityLevel, SignatureLifecycle},
//!     trng::OsTrng,
//! };
//!
//! let entropy = EntropySource::new(OsTrng::new());
//! let mut lifecycle = SignatureLifecycle::new(MlDsa::new(), entropy);
//!
//! lifecycle.generate_key(SecurityLevel::Level2).unwrap();
//! let signature = lifecycle.sign(b"MyMessage").unwrap();
//! let outcome = lifecycle.verify(&signature, b"MyMessage").unwrap();
//!
//! println!("{}", outcome);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod demo;
pub mod entropy;
pub mod metrics;
pub mod signature;
pub mod trng;

// Re-export commonly used types at crate root
pub use config::FileConfig;
pub use demo::DemoReport;
pub use entropy::{EntropyError, EntropySource, EntropyStats};
pub use signature::{
    LifecycleError, MlDsa, SecurityLevel, Signature, SignatureLifecycle, VerificationOutcome,
};
pub use trng::{OsTrng, SimulatedTrng, TrngHardware};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
