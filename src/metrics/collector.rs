//! Metrics collection and registry.

use crate::demo::DemoReport;
use crate::entropy::EntropyStats;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of pipeline state for metrics update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Entropy source counters.
    pub entropy: EntropyStats,
    /// Security level used, if the pass got that far.
    pub level: Option<u8>,
    /// Bytes written by the signer.
    pub signature_bytes: u64,
    /// Outcome of verifying the original message.
    pub verification_valid: Option<bool>,
    /// Pipeline passes that halted on an error.
    pub pipeline_failures: u64,
}

impl MetricsSnapshot {
    /// Creates a snapshot from a completed pass.
    pub fn from_report(report: &DemoReport) -> Self {
        Self {
            entropy: report.entropy,
            level: Some(report.level.number()),
            signature_bytes: report.signature_len as u64,
            verification_valid: Some(report.outcome.is_valid()),
            pipeline_failures: 0,
        }
    }

    /// Creates a snapshot for a pass that halted.
    pub fn failed() -> Self {
        Self {
            pipeline_failures: 1,
            ..Self::default()
        }
    }
}

/// Prometheus metrics registry for the signature pipeline.
pub struct PipelineMetrics {
    registry: Registry,

    // Entropy metrics
    words_requested: IntCounter,
    bytes_delivered: IntCounter,
    hardware_faults: IntCounter,
    health_failures: IntCounter,

    // Signature metrics
    security_level: IntGauge,
    signature_bytes: IntGauge,
    verification_status: IntGauge,

    pipeline_failures: IntCounter,
}

impl PipelineMetrics {
    /// Creates a new registry with all pipeline metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let words_requested = IntCounter::new(
            "mldsa_trng_words_requested_total",
            "TRNG word requests issued, including failed ones",
        )?;
        let bytes_delivered = IntCounter::new(
            "mldsa_trng_bytes_delivered_total",
            "Entropy bytes delivered to callers",
        )?;
        let hardware_faults = IntCounter::new(
            "mldsa_trng_hardware_faults_total",
            "TRNG requests that reported a fault",
        )?;
        let health_failures = IntCounter::new(
            "mldsa_trng_health_failures_total",
            "Continuous health test trips",
        )?;

        let security_level = IntGauge::new(
            "mldsa_trng_security_level",
            "Security level of the current key (0=none)",
        )?;
        let signature_bytes = IntGauge::new(
            "mldsa_trng_signature_bytes",
            "Length of the last signature in bytes",
        )?;
        let verification_status = IntGauge::new(
            "mldsa_trng_verification_status",
            "Last verification result (1=valid, 0=invalid, -1=not run)",
        )?;

        let pipeline_failures = IntCounter::new(
            "mldsa_trng_pipeline_failures_total",
            "Pipeline passes halted by an error",
        )?;

        registry.register(Box::new(words_requested.clone()))?;
        registry.register(Box::new(bytes_delivered.clone()))?;
        registry.register(Box::new(hardware_faults.clone()))?;
        registry.register(Box::new(health_failures.clone()))?;
        registry.register(Box::new(security_level.clone()))?;
        registry.register(Box::new(signature_bytes.clone()))?;
        registry.register(Box::new(verification_status.clone()))?;
        registry.register(Box::new(pipeline_failures.clone()))?;

        verification_status.set(-1);

        Ok(Self {
            registry,
            words_requested,
            bytes_delivered,
            hardware_faults,
            health_failures,
            security_level,
            signature_bytes,
            verification_status,
            pipeline_failures,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters only move forward; apply the difference.
        advance(&self.words_requested, snapshot.entropy.words_requested);
        advance(&self.bytes_delivered, snapshot.entropy.bytes_delivered);
        advance(&self.hardware_faults, snapshot.entropy.hardware_faults);
        advance(&self.health_failures, snapshot.entropy.health_failures);
        advance(&self.pipeline_failures, snapshot.pipeline_failures);

        self.security_level
            .set(snapshot.level.map(i64::from).unwrap_or(0));
        self.signature_bytes.set(snapshot.signature_bytes as i64);
        self.verification_status.set(match snapshot.verification_valid {
            Some(true) => 1,
            Some(false) => 0,
            None => -1,
        });
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            entropy: EntropyStats {
                words_requested: 40,
                bytes_delivered: 160,
                hardware_faults: 0,
                health_failures: 0,
            },
            level: Some(2),
            signature_bytes: 2420,
            verification_valid: Some(true),
            pipeline_failures: 0,
        }
    }

    #[test]
    fn test_registry_creation() {
        assert!(PipelineMetrics::new().is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let metrics = PipelineMetrics::new().unwrap();
        metrics.update(&snapshot());

        let output = metrics.encode().unwrap();
        assert!(output.contains("mldsa_trng_words_requested_total 40"));
        assert!(output.contains("mldsa_trng_bytes_delivered_total 160"));
        assert!(output.contains("mldsa_trng_security_level 2"));
        assert!(output.contains("mldsa_trng_signature_bytes 2420"));
        assert!(output.contains("mldsa_trng_verification_status 1"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let metrics = PipelineMetrics::new().unwrap();
        metrics.update(&snapshot());

        let mut older = snapshot();
        older.entropy.words_requested = 10;
        metrics.update(&older);

        let output = metrics.encode().unwrap();
        assert!(output.contains("mldsa_trng_words_requested_total 40"));
    }

    #[test]
    fn test_failed_snapshot() {
        let metrics = PipelineMetrics::new().unwrap();
        metrics.update(&MetricsSnapshot::failed());

        let output = metrics.encode().unwrap();
        assert!(output.contains("mldsa_trng_pipeline_failures_total 1"));
        assert!(output.contains("mldsa_trng_verification_status -1"));
        assert!(output.contains("mldsa_trng_security_level 0"));
    }

    #[test]
    fn test_snapshot_from_report() {
        use crate::config::FileConfig;
        use crate::trng::SimulatedTrng;

        let config = FileConfig::default();
        let report =
            crate::demo::run(&config, SimulatedTrng::from_os_entropy(&config.trng)).unwrap();
        let snapshot = MetricsSnapshot::from_report(&report);

        assert_eq!(snapshot.level, Some(2));
        assert_eq!(snapshot.signature_bytes, report.signature_len as u64);
        assert_eq!(snapshot.verification_valid, Some(true));
        assert_eq!(snapshot.entropy, report.entropy);
    }
}
