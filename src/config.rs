//! Pipeline configuration.
//!
//! The oscillator polynomials are fixed per board; changing them alters
//! the noise characteristics of the peripheral, so they are validated
//! rather than trusted.

use crate::signature::SecurityLevel;
use crate::trng::{FIRO_POLYNOMIAL, GARO_POLYNOMIAL};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Message signed by the demo pipeline when none is configured.
pub const DEFAULT_MESSAGE: &str = "MyMessage";

/// TRNG peripheral configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrngConfig {
    /// Galois ring oscillator feedback polynomial.
    pub garo_polynomial: u32,
    /// Fibonacci ring oscillator feedback polynomial.
    pub firo_polynomial: u32,
}

impl Default for TrngConfig {
    fn default() -> Self {
        Self {
            garo_polynomial: GARO_POLYNOMIAL,
            firo_polynomial: FIRO_POLYNOMIAL,
        }
    }
}

impl TrngConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.garo_polynomial == 0 || self.firo_polynomial == 0 {
            return Err(ConfigError::InvalidPolynomial);
        }
        Ok(())
    }
}

/// Entropy health test configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Identical consecutive words that mark the source as stuck.
    pub repetition_cutoff: u32,
    /// Bytes drawn and discarded when the entropy context is instantiated.
    pub startup_probe_bytes: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            repetition_cutoff: 3,
            startup_probe_bytes: 64,
        }
    }
}

impl HealthConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repetition_cutoff < 2 {
            return Err(ConfigError::InvalidRepetitionCutoff(self.repetition_cutoff));
        }
        if self.startup_probe_bytes < 4 {
            return Err(ConfigError::InvalidProbeSize(self.startup_probe_bytes));
        }
        Ok(())
    }
}

/// Signing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Security level (2, 3 or 5).
    pub level: SecurityLevel,
    /// Message to sign.
    pub message: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            level: SecurityLevel::Level2,
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl SigningConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.message.is_empty() {
            return Err(ConfigError::EmptyMessage);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("oscillator feedback polynomials must be non-zero")]
    InvalidPolynomial,
    #[error("repetition cutoff {0} too small (must be at least 2)")]
    InvalidRepetitionCutoff(u32),
    #[error("startup probe of {0} bytes too small (must be at least 4)")]
    InvalidProbeSize(usize),
    #[error("message to sign must not be empty")]
    EmptyMessage,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// TRNG peripheral settings.
    #[serde(default)]
    pub trng: TrngConfig,
    /// Health test settings.
    #[serde(default)]
    pub health: HealthConfig,
    /// Signing settings.
    #[serde(default)]
    pub signing: SigningConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trng.validate()?;
        self.health.validate()?;
        self.signing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.signing.level, SecurityLevel::Level2);
        assert_eq!(config.signing.message, "MyMessage");
        assert_eq!(config.trng.garo_polynomial, 0x6C74_0B8D);
        assert_eq!(config.trng.firo_polynomial, 0x52D2_46E1);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = FileConfig::from_toml(
            r#"
            [signing]
            level = 5

            [health]
            repetition_cutoff = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.signing.level, SecurityLevel::Level5);
        assert_eq!(config.signing.message, DEFAULT_MESSAGE);
        assert_eq!(config.health.repetition_cutoff, 4);
        assert_eq!(config.health.startup_probe_bytes, 64);
    }

    #[test]
    fn test_unsupported_level_rejected() {
        let result = FileConfig::from_toml("[signing]\nlevel = 4\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_zero_polynomial_invalid() {
        let result = FileConfig::from_toml("[trng]\ngaro_polynomial = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidPolynomial)));
    }

    #[test]
    fn test_small_cutoff_invalid() {
        let health = HealthConfig {
            repetition_cutoff: 1,
            ..Default::default()
        };
        assert!(matches!(
            health.validate(),
            Err(ConfigError::InvalidRepetitionCutoff(1))
        ));
    }

    #[test]
    fn test_empty_message_invalid() {
        let result = FileConfig::from_toml("[signing]\nmessage = \"\"\n");
        assert!(matches!(result, Err(ConfigError::EmptyMessage)));
    }

    #[test]
    fn test_missing_file() {
        let result = FileConfig::from_file("/nonexistent/mldsa-trng.toml");
        assert!(matches!(result, Err(ConfigError::FileReadError(_))));
    }
}
