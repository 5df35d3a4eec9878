//! ML-DSA TRNG Pipeline CLI
//!
//! Generates a keypair from the TRNG, signs a message, verifies it and
//! prints the verification result.

use clap::{Parser, ValueEnum};
use mldsa_trng::{
    config::FileConfig,
    metrics::{MetricsSnapshot, PipelineMetrics},
    trng::{OsTrng, SimulatedTrng, TrngHardware},
    SecurityLevel,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Word source backing the entropy pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// ChaCha20 oscillator model keyed from OS entropy
    Simulated,
    /// Operating system generator, one request per word
    Os,
}

/// Keygen, sign and verify a message with ML-DSA on TRNG entropy
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Security level (2, 3 or 5)
    #[arg(short, long, value_parser = parse_level)]
    level: Option<SecurityLevel>,

    /// Message to sign
    #[arg(short, long)]
    message: Option<String>,

    /// Entropy source
    #[arg(short, long, value_enum, default_value_t = Source::Simulated)]
    source: Source,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    metrics: bool,
}

fn parse_level(value: &str) -> Result<SecurityLevel, String> {
    let number: u8 = value
        .parse()
        .map_err(|_| format!("'{}' is not a level number", value))?;
    SecurityLevel::try_from(number).map_err(|e| e.to_string())
}

fn load_config(args: &Args) -> Result<FileConfig, mldsa_trng::config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    if let Some(level) = args.level {
        config.signing.level = level;
    }
    if let Some(message) = &args.message {
        config.signing.message = message.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("ML-DSA TRNG pipeline v{}", mldsa_trng::VERSION);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let hardware: Box<dyn TrngHardware> = match args.source {
        Source::Simulated => {
            info!("Using simulated oscillator source");
            Box::new(SimulatedTrng::from_os_entropy(&config.trng))
        }
        Source::Os => {
            info!("Using operating system word source");
            Box::new(OsTrng::new())
        }
    };

    let result = mldsa_trng::demo::run(&config, hardware);

    let snapshot = match &result {
        Ok(report) => {
            info!(
                level = report.level.number(),
                signature_bytes = report.signature_len,
                max_bytes = report.max_signature_len,
                fingerprint = %report.key_fingerprint,
                altered_message = %report.altered_message_outcome,
                "Pipeline complete"
            );
            if !report.outcome.is_valid() {
                warn!("Signature did not verify against its own message");
            }
            MetricsSnapshot::from_report(report)
        }
        Err(e) => {
            error!(error = %e, "Pipeline halted");
            MetricsSnapshot::failed()
        }
    };

    if args.metrics {
        match PipelineMetrics::new().and_then(|metrics| {
            metrics.update(&snapshot);
            metrics.encode()
        }) {
            Ok(text) => print!("{}", text),
            Err(e) => warn!("Failed to render metrics: {}", e),
        }
    }

    match result {
        Ok(report) => println!("{}", report),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
