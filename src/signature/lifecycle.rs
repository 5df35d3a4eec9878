//! Keygen → sign → verify lifecycle.
//!
//! # State machine
//!
//! ```text
//! Uninitialized ──generate_key──▶ KeyGenerated ──sign──▶ Signed ──verify──▶ Verified
//!                                                                  ▲            │
//!                                                                  └──verify────┘
//! any step error ──▶ Failed (terminal)
//! ```
//!
//! Calls made in the wrong state are rejected and leave the state
//! untouched. A step that runs and fails moves the lifecycle to `Failed`,
//! drops the key, and every later call returns [`LifecycleError::Halted`].
//! An `Invalid` verification is a normal outcome, not a failure.

use super::buffer::{Signature, SignatureBuffer};
use super::key::Key;
use super::level::SecurityLevel;
use super::scheme::{SchemeError, SignatureScheme};
use crate::entropy::EntropySource;
use crate::trng::TrngHardware;
use thiserror::Error;

/// Lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No key yet.
    Uninitialized,
    /// Keypair derived, nothing signed.
    KeyGenerated,
    /// One signature produced.
    Signed,
    /// At least one verification completed.
    Verified,
    /// A step failed; terminal.
    Failed,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::KeyGenerated => "key-generated",
            Self::Signed => "signed",
            Self::Verified => "verified",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Key generation step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    /// Bringing up the entropy context.
    InitEntropy,
    /// Creating the empty key object.
    InitKey,
    /// Binding the key to a security level.
    SetLevel,
    /// Deriving the keypair.
    MakeKeypair,
}

impl std::fmt::Display for KeyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InitEntropy => "entropy initialization",
            Self::InitKey => "key initialization",
            Self::SetLevel => "security level binding",
            Self::MakeKeypair => "keypair derivation",
        };
        f.write_str(name)
    }
}

/// Result of a verification that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The signature matches the message and key.
    Valid,
    /// The check ran and rejected the signature.
    Invalid,
}

impl VerificationOutcome {
    /// Returns true for [`VerificationOutcome::Valid`].
    #[inline]
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

impl std::fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => f.write_str("Signature verification succeeded!"),
            Self::Invalid => f.write_str("Signature verification failed!"),
        }
    }
}

/// Errors surfaced by the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("key generation failed during {phase}: {source}")]
    KeyGeneration {
        phase: KeyPhase,
        #[source]
        source: SchemeError,
    },
    #[error("signing failed: {0}")]
    Signing(#[source] SchemeError),
    #[error("verification could not be completed: {0}")]
    Verification(#[source] SchemeError),
    #[error("{operation} not allowed in state {state}")]
    OutOfOrder {
        operation: &'static str,
        state: LifecycleState,
    },
    #[error("pipeline halted after an earlier failure")]
    Halted,
}

impl LifecycleError {
    /// Returns true if the failure originated in the TRNG hardware.
    pub fn is_hardware_entropy_failure(&self) -> bool {
        use crate::entropy::EntropyError;

        let source = match self {
            Self::KeyGeneration { source, .. } | Self::Signing(source) => source,
            _ => return false,
        };
        matches!(
            source,
            SchemeError::Entropy(EntropyError::Hardware { .. })
        )
    }
}

/// Drives one key through generation, signing and verification.
///
/// Owns the entropy source and the key exclusively; independent pipelines
/// each need their own instance.
pub struct SignatureLifecycle<S, H> {
    scheme: S,
    entropy: EntropySource<H>,
    key: Option<Key>,
    state: LifecycleState,
}

impl<S: SignatureScheme, H: TrngHardware> SignatureLifecycle<S, H> {
    /// Creates a lifecycle over `scheme`, drawing randomness from `entropy`.
    pub fn new(scheme: S, entropy: EntropySource<H>) -> Self {
        Self {
            scheme,
            entropy,
            key: None,
            state: LifecycleState::Uninitialized,
        }
    }

    /// Generates a keypair at `level`.
    ///
    /// Runs entropy initialization, key initialization, level binding and
    /// keypair derivation in order; the first failing step aborts the
    /// whole operation and no key is kept.
    pub fn generate_key(&mut self, level: SecurityLevel) -> Result<(), LifecycleError> {
        self.expect_state("generate_key", &[LifecycleState::Uninitialized])?;

        match self.derive_key(level) {
            Ok(key) => {
                tracing::info!(
                    level = level.number(),
                    algorithm = level.algorithm(),
                    fingerprint = key.fingerprint().as_deref().unwrap_or("-"),
                    "Keypair generated"
                );
                self.key = Some(key);
                self.state = LifecycleState::KeyGenerated;
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    fn derive_key(&mut self, level: SecurityLevel) -> Result<Key, LifecycleError> {
        let step = |phase: KeyPhase| {
            move |source: SchemeError| LifecycleError::KeyGeneration { phase, source }
        };

        self.entropy
            .instantiate()
            .map_err(|e| step(KeyPhase::InitEntropy)(e.into()))?;

        let mut key = self.scheme.init_key().map_err(step(KeyPhase::InitKey))?;

        self.scheme
            .set_level(&mut key, level)
            .map_err(step(KeyPhase::SetLevel))?;

        let derived = self.scheme.make_keypair(&mut key, &mut self.entropy);
        derived
            .map_err(|e| self.attribute_entropy(e))
            .map_err(step(KeyPhase::MakeKeypair))?;

        if !key.is_populated() {
            return Err(step(KeyPhase::MakeKeypair)(SchemeError::KeyNotPopulated));
        }
        Ok(key)
    }

    /// Signs `message` into a buffer sized for the key's level.
    pub fn sign(&mut self, message: &[u8]) -> Result<Signature, LifecycleError> {
        self.expect_state("sign", &[LifecycleState::KeyGenerated])?;
        let level = match self.key.as_ref().and_then(Key::level) {
            Some(level) => level,
            None => return Err(self.fail(LifecycleError::Signing(SchemeError::LevelNotSet))),
        };
        self.sign_into(message, SignatureBuffer::for_level(level))
    }

    /// Signs `message` into a caller-supplied buffer.
    ///
    /// The buffer must hold at least the level's maximum signature length.
    pub fn sign_into(
        &mut self,
        message: &[u8],
        mut buffer: SignatureBuffer,
    ) -> Result<Signature, LifecycleError> {
        self.expect_state("sign", &[LifecycleState::KeyGenerated])?;

        match self.produce_signature(message, &mut buffer) {
            Ok((level, written)) => match buffer.finish(level, written) {
                Ok(signature) => {
                    tracing::info!(
                        message_bytes = message.len(),
                        signature_bytes = signature.len(),
                        max_bytes = signature.max_len(),
                        "Message signed"
                    );
                    self.state = LifecycleState::Signed;
                    Ok(signature)
                }
                Err(e) => Err(self.fail(LifecycleError::Signing(e))),
            },
            Err(e) => Err(self.fail(LifecycleError::Signing(e))),
        }
    }

    fn produce_signature(
        &mut self,
        message: &[u8],
        buffer: &mut SignatureBuffer,
    ) -> Result<(SecurityLevel, usize), SchemeError> {
        if message.is_empty() {
            return Err(SchemeError::EmptyMessage);
        }
        let key = self.key.as_ref().ok_or(SchemeError::KeyNotPopulated)?;
        let level = key.level().ok_or(SchemeError::LevelNotSet)?;

        let written = self
            .scheme
            .sign(message, key, &mut self.entropy, buffer)
            .map_err(|e| self.attribute_entropy(e))?;
        Ok((level, written))
    }

    /// Verifies `signature` over `message` against this lifecycle's key.
    pub fn verify(
        &mut self,
        signature: &Signature,
        message: &[u8],
    ) -> Result<VerificationOutcome, LifecycleError> {
        self.expect_state("verify", &[LifecycleState::Signed, LifecycleState::Verified])?;

        let checked = match self.key.as_ref() {
            Some(key) => check(&self.scheme, signature, message, key),
            None => Err(SchemeError::KeyNotPopulated),
        };
        self.settle(checked)
    }

    /// Verifies `signature` over `message` against an arbitrary key.
    ///
    /// Works for keys from other lifecycles; a mismatched key yields
    /// [`VerificationOutcome::Invalid`].
    pub fn verify_with_key(
        &mut self,
        signature: &Signature,
        message: &[u8],
        key: &Key,
    ) -> Result<VerificationOutcome, LifecycleError> {
        self.expect_state("verify", &[LifecycleState::Signed, LifecycleState::Verified])?;

        let checked = check(&self.scheme, signature, message, key);
        self.settle(checked)
    }

    fn settle(
        &mut self,
        checked: Result<bool, SchemeError>,
    ) -> Result<VerificationOutcome, LifecycleError> {
        match checked {
            Ok(accepted) => {
                let outcome = if accepted {
                    VerificationOutcome::Valid
                } else {
                    VerificationOutcome::Invalid
                };
                tracing::info!(valid = accepted, "Signature verified");
                self.state = LifecycleState::Verified;
                Ok(outcome)
            }
            Err(e) => Err(self.fail(LifecycleError::Verification(e))),
        }
    }

    /// Maps an opaque backend error to the latched entropy fault, if any.
    fn attribute_entropy(&self, error: SchemeError) -> SchemeError {
        match (self.entropy.fault(), &error) {
            (Some(fault), SchemeError::Backend(_)) => SchemeError::Entropy(fault.clone()),
            _ => error,
        }
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[LifecycleState],
    ) -> Result<(), LifecycleError> {
        if self.state == LifecycleState::Failed {
            return Err(LifecycleError::Halted);
        }
        if !allowed.contains(&self.state) {
            return Err(LifecycleError::OutOfOrder {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn fail(&mut self, error: LifecycleError) -> LifecycleError {
        tracing::warn!(error = %error, state = %self.state, "Lifecycle failed");
        self.state = LifecycleState::Failed;
        self.key = None;
        error
    }

    /// Returns the current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns the generated key, if any.
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Returns the entropy source.
    pub fn entropy(&self) -> &EntropySource<H> {
        &self.entropy
    }
}

fn check<S: SignatureScheme>(
    scheme: &S,
    signature: &Signature,
    message: &[u8],
    key: &Key,
) -> Result<bool, SchemeError> {
    let key_level = key.level().ok_or(SchemeError::LevelNotSet)?;
    if signature.level() != key_level {
        return Err(SchemeError::LevelMismatch {
            signature: signature.level(),
            key: key_level,
        });
    }
    scheme.verify(signature.as_bytes(), message, key)
}

impl<S, H> std::fmt::Debug for SignatureLifecycle<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureLifecycle")
            .field("state", &self.state)
            .field("key", &self.key)
            .field("entropy", &self.entropy)
            .finish_non_exhaustive()
    }
}
