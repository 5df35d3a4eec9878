//! One-shot keygen → sign → verify pass.
//!
//! Drives a [`SignatureLifecycle`] end to end on a single message and
//! additionally checks that a modified copy of the message is rejected.

use crate::config::FileConfig;
use crate::entropy::{EntropySource, EntropyStats};
use crate::signature::{
    LifecycleError, MlDsa, SecurityLevel, SignatureLifecycle, VerificationOutcome,
};
use crate::trng::TrngHardware;

/// Suffix appended to the message for the negative check.
const ALTERED_SUFFIX: &[u8] = b"2";

/// Summary of a completed pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    /// Security level used.
    pub level: SecurityLevel,
    /// Length of the signed message in bytes.
    pub message_len: usize,
    /// Bytes actually written by the signer.
    pub signature_len: usize,
    /// Upper bound for the level.
    pub max_signature_len: usize,
    /// Public key fingerprint.
    pub key_fingerprint: String,
    /// Verification of the original message.
    pub outcome: VerificationOutcome,
    /// Verification of the message with a suffix appended.
    pub altered_message_outcome: VerificationOutcome,
    /// Entropy counters at the end of the pass.
    pub entropy: EntropyStats,
}

impl std::fmt::Display for DemoReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.outcome)
    }
}

/// Runs one pass over `hardware` using `config`.
///
/// Any step failure halts the pass and is returned; an `Invalid`
/// verification is reported, not returned as an error.
pub fn run<H: TrngHardware>(
    config: &FileConfig,
    hardware: H,
) -> Result<DemoReport, LifecycleError> {
    let level = config.signing.level;
    let message = config.signing.message.as_bytes();

    tracing::info!(
        level = level.number(),
        algorithm = level.algorithm(),
        message_bytes = message.len(),
        "Starting signature pipeline"
    );

    let entropy = EntropySource::with_config(hardware, config.trng.clone(), &config.health);
    let mut lifecycle = SignatureLifecycle::new(MlDsa::new(), entropy);

    lifecycle.generate_key(level)?;
    let key_fingerprint = lifecycle
        .key()
        .and_then(|key| key.fingerprint())
        .unwrap_or_default();

    let signature = lifecycle.sign(message)?;
    let outcome = lifecycle.verify(&signature, message)?;

    let altered = [message, ALTERED_SUFFIX].concat();
    let altered_message_outcome = lifecycle.verify(&signature, &altered)?;
    if altered_message_outcome.is_valid() {
        tracing::warn!("Signature accepted for an altered message");
    }

    Ok(DemoReport {
        level,
        message_len: message.len(),
        signature_len: signature.len(),
        max_signature_len: signature.max_len(),
        key_fingerprint,
        outcome,
        altered_message_outcome,
        entropy: lifecycle.entropy().stats(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningConfig;
    use crate::signature::{KeyPhase, SchemeError};
    use crate::trng::{SequenceTrng, SimulatedTrng};

    fn config(level: SecurityLevel, message: &str) -> FileConfig {
        FileConfig {
            signing: SigningConfig {
                level,
                message: message.to_string(),
            },
            ..FileConfig::default()
        }
    }

    fn simulated(config: &FileConfig) -> SimulatedTrng {
        SimulatedTrng::from_os_entropy(&config.trng)
    }

    #[test]
    fn test_default_pass() {
        let config = FileConfig::default();
        let report = run(&config, simulated(&config)).unwrap();

        assert_eq!(report.level, SecurityLevel::Level2);
        assert_eq!(report.message_len, 9);
        assert!(report.signature_len <= 2420);
        assert_eq!(report.max_signature_len, 2420);
        assert_eq!(report.outcome, VerificationOutcome::Valid);
        assert_eq!(report.altered_message_outcome, VerificationOutcome::Invalid);
        assert_eq!(report.key_fingerprint.len(), 16);
        assert_eq!(report.to_string(), "Signature verification succeeded!");
    }

    #[test]
    fn test_every_level() {
        for level in SecurityLevel::ALL {
            let config = config(level, "MyMessage");
            let report = run(&config, simulated(&config)).unwrap();

            assert_eq!(report.level, level);
            assert!(report.signature_len <= level.max_signature_len());
            assert!(report.outcome.is_valid());
            assert!(!report.altered_message_outcome.is_valid());
        }
    }

    #[test]
    fn test_entropy_accounting() {
        let config = FileConfig::default();
        let report = run(&config, simulated(&config)).unwrap();

        assert!(report.entropy.bytes_delivered >= config.health.startup_probe_bytes as u64);
        assert_eq!(report.entropy.hardware_faults, 0);
        assert_eq!(report.entropy.health_failures, 0);
    }

    #[test]
    fn test_single_byte_message() {
        let config = config(SecurityLevel::Level2, "x");
        let report = run(&config, simulated(&config)).unwrap();
        assert_eq!(report.message_len, 1);
        assert!(report.outcome.is_valid());
    }

    #[test]
    fn test_empty_message_halts() {
        let config = config(SecurityLevel::Level2, "");
        let result = run(&config, simulated(&config));
        assert_eq!(
            result,
            Err(LifecycleError::Signing(SchemeError::EmptyMessage))
        );
    }

    #[test]
    fn test_dead_peripheral_halts_before_keygen() {
        let config = FileConfig::default();
        let error = run(&config, SequenceTrng::new(7).failing_after(0)).unwrap_err();

        assert!(error.is_hardware_entropy_failure());
        assert!(matches!(
            error,
            LifecycleError::KeyGeneration {
                phase: KeyPhase::InitEntropy,
                ..
            }
        ));
    }

    #[test]
    fn test_stuck_peripheral_halts() {
        let config = FileConfig::default();
        let error = run(&config, SequenceTrng::constant(0)).unwrap_err();

        assert!(matches!(
            error,
            LifecycleError::KeyGeneration {
                phase: KeyPhase::InitEntropy,
                source: SchemeError::Entropy(crate::entropy::EntropyError::HealthTest(_))
            }
        ));
        assert!(!error.is_hardware_entropy_failure());
    }
}
