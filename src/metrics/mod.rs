//! Prometheus metrics for the signature pipeline.
//!
//! The process runs a single pass, so metrics are rendered once in text
//! exposition format rather than served over HTTP.
//!
//! # Metrics Exposed
//!
//! ## Entropy Metrics
//! - `mldsa_trng_words_requested_total` - TRNG requests issued
//! - `mldsa_trng_bytes_delivered_total` - Entropy bytes delivered
//! - `mldsa_trng_hardware_faults_total` - Requests that reported a fault
//! - `mldsa_trng_health_failures_total` - Health test trips
//!
//! ## Signature Metrics
//! - `mldsa_trng_security_level` - Level of the current key
//! - `mldsa_trng_signature_bytes` - Length of the last signature
//! - `mldsa_trng_verification_status` - Last verification (1=valid, 0=invalid, -1=not run)
//! - `mldsa_trng_pipeline_failures_total` - Passes halted by an error
//!
//! # Example
//!
//! ```no_run
//! use mldsa_trng::metrics::{MetricsSnapshot, PipelineMetrics};
//!
//! let metrics = PipelineMetrics::new().expect("Failed to create registry");
//! metrics.update(&MetricsSnapshot::failed());
//! println!("{}", metrics.encode().expect("Failed to encode"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsSnapshot, PipelineMetrics};
