//! Keypair state owned by the signing lifecycle.

use super::level::SecurityLevel;
use super::scheme::SchemeError;
use sha2::{Digest, Sha256};

/// Encoded keypair material.
#[derive(Clone)]
struct KeyMaterial {
    public: Vec<u8>,
    secret: Vec<u8>,
}

/// Signature keypair.
///
/// Starts empty, is bound to a [`SecurityLevel`], then populated by key
/// generation. Rebinding the level discards any existing material.
#[derive(Clone, Default)]
pub struct Key {
    level: Option<SecurityLevel>,
    material: Option<KeyMaterial>,
}

impl Key {
    /// Creates an empty, unbound key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the key to `level`, discarding any keypair material.
    pub fn bind_level(&mut self, level: SecurityLevel) {
        self.level = Some(level);
        self.material = None;
    }

    /// Stores freshly generated keypair material.
    ///
    /// Both encodings must match the lengths of the bound level.
    pub fn install(&mut self, public: Vec<u8>, secret: Vec<u8>) -> Result<(), SchemeError> {
        let level = self.level.ok_or(SchemeError::LevelNotSet)?;
        if public.len() != level.public_key_len() {
            return Err(SchemeError::InvalidLength {
                what: "public key",
                expected: level.public_key_len(),
                got: public.len(),
            });
        }
        if secret.len() != level.secret_key_len() {
            return Err(SchemeError::InvalidLength {
                what: "secret key",
                expected: level.secret_key_len(),
                got: secret.len(),
            });
        }
        self.material = Some(KeyMaterial { public, secret });
        Ok(())
    }

    /// Returns the bound level, if any.
    #[inline]
    pub fn level(&self) -> Option<SecurityLevel> {
        self.level
    }

    /// Returns true once keypair material has been installed.
    #[inline]
    pub fn is_populated(&self) -> bool {
        self.material.is_some()
    }

    /// Returns the encoded public key.
    pub fn public_key(&self) -> Option<&[u8]> {
        self.material.as_ref().map(|m| m.public.as_slice())
    }

    /// Returns the encoded secret key.
    pub fn secret_key(&self) -> Option<&[u8]> {
        self.material.as_ref().map(|m| m.secret.as_slice())
    }

    /// Returns a short hex fingerprint of the public key.
    ///
    /// The first 8 bytes of SHA-256 over the encoded public key.
    pub fn fingerprint(&self) -> Option<String> {
        let public = self.public_key()?;
        let digest = Sha256::digest(public);
        Some(digest[..8].iter().map(|b| format!("{:02x}", b)).collect())
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("level", &self.level.map(SecurityLevel::number))
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(level: SecurityLevel, fill: u8) -> (Vec<u8>, Vec<u8>) {
        (
            vec![fill; level.public_key_len()],
            vec![fill; level.secret_key_len()],
        )
    }

    #[test]
    fn test_install_requires_level() {
        let mut key = Key::new();
        let (public, secret) = material(SecurityLevel::Level2, 1);
        assert!(matches!(
            key.install(public, secret),
            Err(SchemeError::LevelNotSet)
        ));
    }

    #[test]
    fn test_install_checks_lengths() {
        let mut key = Key::new();
        key.bind_level(SecurityLevel::Level3);
        let (public, secret) = material(SecurityLevel::Level2, 1);
        assert!(matches!(
            key.install(public, secret),
            Err(SchemeError::InvalidLength {
                what: "public key",
                ..
            })
        ));
        assert!(!key.is_populated());
    }

    #[test]
    fn test_rebinding_discards_material() {
        let mut key = Key::new();
        key.bind_level(SecurityLevel::Level2);
        let (public, secret) = material(SecurityLevel::Level2, 1);
        key.install(public, secret).unwrap();
        assert!(key.is_populated());

        key.bind_level(SecurityLevel::Level5);
        assert!(!key.is_populated());
        assert_eq!(key.level(), Some(SecurityLevel::Level5));
    }

    #[test]
    fn test_fingerprint_tracks_public_key() {
        let mut a = Key::new();
        let mut b = Key::new();
        a.bind_level(SecurityLevel::Level2);
        b.bind_level(SecurityLevel::Level2);
        assert_eq!(a.fingerprint(), None);

        let (pa, sa) = material(SecurityLevel::Level2, 1);
        let (pb, sb) = material(SecurityLevel::Level2, 2);
        a.install(pa, sa).unwrap();
        b.install(pb, sb).unwrap();

        let fa = a.fingerprint().unwrap();
        assert_eq!(fa.len(), 16);
        assert_ne!(Some(fa), b.fingerprint());
    }

    #[test]
    fn test_debug_hides_secret() {
        let mut key = Key::new();
        key.bind_level(SecurityLevel::Level2);
        let (public, secret) = material(SecurityLevel::Level2, 0xAB);
        key.install(public, secret).unwrap();

        let rendered = format!("{:?}", key);
        assert!(rendered.len() < 100);
        assert!(!rendered.contains("secret"));
    }
}
