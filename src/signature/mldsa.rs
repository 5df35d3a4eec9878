//! ML-DSA backend (FIPS 204).
//!
//! Levels 2, 3 and 5 map to ML-DSA-44, ML-DSA-65 and ML-DSA-87. Keys are
//! held in their encoded form and decoded per operation. Signing uses
//! the hedged variant, so every signature draws fresh randomness from
//! the supplied generator.

use super::buffer::SignatureBuffer;
use super::key::Key;
use super::level::{
    SecurityLevel, ML_DSA_44_PK_LEN, ML_DSA_44_SIG_LEN, ML_DSA_44_SK_LEN, ML_DSA_65_PK_LEN,
    ML_DSA_65_SIG_LEN, ML_DSA_65_SK_LEN, ML_DSA_87_PK_LEN, ML_DSA_87_SIG_LEN, ML_DSA_87_SK_LEN,
};
use super::scheme::{SchemeError, SignatureScheme};
use fips204::traits::{SerDes, Signer, Verifier};
use fips204::{ml_dsa_44, ml_dsa_65, ml_dsa_87};
use rand_core::CryptoRngCore;

/// Context string bound into every signature.
const CONTEXT: &[u8] = b"";

/// ML-DSA signature scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct MlDsa;

impl MlDsa {
    pub fn new() -> Self {
        Self
    }
}

fn generate<R: CryptoRngCore>(
    level: SecurityLevel,
    rng: &mut R,
) -> Result<(Vec<u8>, Vec<u8>), SchemeError> {
    macro_rules! generate_as {
        ($module:ident) => {{
            let (pk, sk) = $module::try_keygen_with_rng(rng).map_err(SchemeError::Backend)?;
            Ok((pk.into_bytes().to_vec(), sk.into_bytes().to_vec()))
        }};
    }

    match level {
        SecurityLevel::Level2 => generate_as!(ml_dsa_44),
        SecurityLevel::Level3 => generate_as!(ml_dsa_65),
        SecurityLevel::Level5 => generate_as!(ml_dsa_87),
    }
}

fn sign_with<R: CryptoRngCore>(
    level: SecurityLevel,
    secret: &[u8],
    message: &[u8],
    rng: &mut R,
    out: &mut SignatureBuffer,
) -> Result<usize, SchemeError> {
    macro_rules! sign_as {
        ($module:ident, $sk_len:expr) => {{
            let encoded: [u8; $sk_len] =
                secret
                    .try_into()
                    .map_err(|_| SchemeError::InvalidLength {
                        what: "secret key",
                        expected: $sk_len,
                        got: secret.len(),
                    })?;
            let sk = $module::PrivateKey::try_from_bytes(encoded).map_err(SchemeError::Backend)?;
            let sig = sk
                .try_sign_with_rng(rng, message, CONTEXT)
                .map_err(SchemeError::Backend)?;
            out.as_mut_slice()[..sig.len()].copy_from_slice(&sig);
            Ok(sig.len())
        }};
    }

    match level {
        SecurityLevel::Level2 => sign_as!(ml_dsa_44, ML_DSA_44_SK_LEN),
        SecurityLevel::Level3 => sign_as!(ml_dsa_65, ML_DSA_65_SK_LEN),
        SecurityLevel::Level5 => sign_as!(ml_dsa_87, ML_DSA_87_SK_LEN),
    }
}

fn verify_with(
    level: SecurityLevel,
    public: &[u8],
    signature: &[u8],
    message: &[u8],
) -> Result<bool, SchemeError> {
    macro_rules! verify_as {
        ($module:ident, $pk_len:expr, $sig_len:expr) => {{
            let encoded: [u8; $pk_len] =
                public
                    .try_into()
                    .map_err(|_| SchemeError::InvalidLength {
                        what: "public key",
                        expected: $pk_len,
                        got: public.len(),
                    })?;
            let pk = $module::PublicKey::try_from_bytes(encoded).map_err(SchemeError::Backend)?;
            let sig: [u8; $sig_len] =
                signature
                    .try_into()
                    .map_err(|_| SchemeError::InvalidLength {
                        what: "signature",
                        expected: $sig_len,
                        got: signature.len(),
                    })?;
            Ok(pk.verify(message, &sig, CONTEXT))
        }};
    }

    match level {
        SecurityLevel::Level2 => verify_as!(ml_dsa_44, ML_DSA_44_PK_LEN, ML_DSA_44_SIG_LEN),
        SecurityLevel::Level3 => verify_as!(ml_dsa_65, ML_DSA_65_PK_LEN, ML_DSA_65_SIG_LEN),
        SecurityLevel::Level5 => verify_as!(ml_dsa_87, ML_DSA_87_PK_LEN, ML_DSA_87_SIG_LEN),
    }
}

impl SignatureScheme for MlDsa {
    fn supports(&self, _level: SecurityLevel) -> bool {
        true
    }

    fn init_key(&self) -> Result<Key, SchemeError> {
        Ok(Key::new())
    }

    fn set_level(&self, key: &mut Key, level: SecurityLevel) -> Result<(), SchemeError> {
        if !self.supports(level) {
            return Err(SchemeError::UnsupportedLevel(level));
        }
        key.bind_level(level);
        Ok(())
    }

    fn make_keypair<R: CryptoRngCore>(
        &self,
        key: &mut Key,
        rng: &mut R,
    ) -> Result<(), SchemeError> {
        let level = key.level().ok_or(SchemeError::LevelNotSet)?;
        let (public, secret) = generate(level, rng)?;
        key.install(public, secret)
    }

    fn sign<R: CryptoRngCore>(
        &self,
        message: &[u8],
        key: &Key,
        rng: &mut R,
        out: &mut SignatureBuffer,
    ) -> Result<usize, SchemeError> {
        if message.is_empty() {
            return Err(SchemeError::EmptyMessage);
        }
        let level = key.level().ok_or(SchemeError::LevelNotSet)?;
        let secret = key.secret_key().ok_or(SchemeError::KeyNotPopulated)?;
        if out.capacity() < level.max_signature_len() {
            return Err(SchemeError::BufferTooSmall {
                capacity: out.capacity(),
                required: level.max_signature_len(),
            });
        }
        sign_with(level, secret, message, rng, out)
    }

    fn verify(&self, signature: &[u8], message: &[u8], key: &Key) -> Result<bool, SchemeError> {
        let level = key.level().ok_or(SchemeError::LevelNotSet)?;
        let public = key.public_key().ok_or(SchemeError::KeyNotPopulated)?;
        verify_with(level, public, signature, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrngConfig;
    use crate::entropy::EntropySource;
    use crate::trng::{SequenceTrng, SimulatedTrng};

    fn rng(seed: u8) -> EntropySource<SimulatedTrng> {
        EntropySource::new(SimulatedTrng::from_seed([seed; 32], &TrngConfig::default()))
    }

    fn keypair(level: SecurityLevel, seed: u8) -> Key {
        let scheme = MlDsa::new();
        let mut key = scheme.init_key().unwrap();
        scheme.set_level(&mut key, level).unwrap();
        scheme.make_keypair(&mut key, &mut rng(seed)).unwrap();
        key
    }

    fn sign(key: &Key, message: &[u8]) -> Vec<u8> {
        let scheme = MlDsa::new();
        let level = key.level().unwrap();
        let mut out = SignatureBuffer::for_level(level);
        let written = scheme.sign(message, key, &mut rng(99), &mut out).unwrap();
        out.finish(level, written).unwrap().as_bytes().to_vec()
    }

    #[test]
    fn test_sign_verify_all_levels() {
        let scheme = MlDsa::new();
        for level in SecurityLevel::ALL {
            let key = keypair(level, 1);
            assert_eq!(key.public_key().unwrap().len(), level.public_key_len());
            assert_eq!(key.secret_key().unwrap().len(), level.secret_key_len());

            let signature = sign(&key, b"MyMessage");
            assert!(signature.len() <= level.max_signature_len());
            assert_eq!(scheme.verify(&signature, b"MyMessage", &key), Ok(true));
        }
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let scheme = MlDsa::new();
        let key = keypair(SecurityLevel::Level2, 2);
        let mut signature = sign(&key, b"MyMessage");

        signature[17] ^= 0x01;

        assert_eq!(scheme.verify(&signature, b"MyMessage", &key), Ok(false));
    }

    #[test]
    fn test_other_key_rejected() {
        let scheme = MlDsa::new();
        let key = keypair(SecurityLevel::Level2, 3);
        let other = keypair(SecurityLevel::Level2, 4);
        let signature = sign(&key, b"MyMessage");

        assert_eq!(scheme.verify(&signature, b"MyMessage", &other), Ok(false));
    }

    #[test]
    fn test_truncated_signature_is_error() {
        let scheme = MlDsa::new();
        let key = keypair(SecurityLevel::Level2, 5);
        let signature = sign(&key, b"MyMessage");

        let result = scheme.verify(&signature[..100], b"MyMessage", &key);
        assert!(matches!(
            result,
            Err(SchemeError::InvalidLength {
                what: "signature",
                ..
            })
        ));
    }

    #[test]
    fn test_undersized_buffer_rejected() {
        let scheme = MlDsa::new();
        let key = keypair(SecurityLevel::Level3, 6);
        let mut out = SignatureBuffer::for_level(SecurityLevel::Level2);

        let result = scheme.sign(b"MyMessage", &key, &mut rng(7), &mut out);
        assert_eq!(
            result,
            Err(SchemeError::BufferTooSmall {
                capacity: 2420,
                required: 3309
            })
        );
    }

    #[test]
    fn test_empty_message_rejected() {
        let scheme = MlDsa::new();
        let key = keypair(SecurityLevel::Level2, 8);
        let mut out = SignatureBuffer::for_level(SecurityLevel::Level2);

        assert_eq!(
            scheme.sign(b"", &key, &mut rng(9), &mut out),
            Err(SchemeError::EmptyMessage)
        );
    }

    #[test]
    fn test_unpopulated_key_rejected() {
        let scheme = MlDsa::new();
        let mut key = scheme.init_key().unwrap();
        let mut out = SignatureBuffer::for_level(SecurityLevel::Level2);
        assert_eq!(
            scheme.sign(b"m", &key, &mut rng(1), &mut out),
            Err(SchemeError::LevelNotSet)
        );

        scheme.set_level(&mut key, SecurityLevel::Level2).unwrap();
        assert_eq!(
            scheme.sign(b"m", &key, &mut rng(1), &mut out),
            Err(SchemeError::KeyNotPopulated)
        );
    }

    #[test]
    fn test_keygen_reproducible_from_fixed_sequence() {
        let scheme = MlDsa::new();
        let mut a = Key::new();
        let mut b = Key::new();
        a.bind_level(SecurityLevel::Level2);
        b.bind_level(SecurityLevel::Level2);

        scheme
            .make_keypair(&mut a, &mut EntropySource::new(SequenceTrng::new(42)))
            .unwrap();
        scheme
            .make_keypair(&mut b, &mut EntropySource::new(SequenceTrng::new(42)))
            .unwrap();

        assert_eq!(a.public_key(), b.public_key());
    }
}
