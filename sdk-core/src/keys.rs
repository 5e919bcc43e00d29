//! Key material shared by every codec call
//!
//! Built once when the client starts and read-only afterwards. The private
//! key is the merchant's; the public key (and its PEM form) is the
//! counterparty gateway's.

use crate::crypto::keys::{parse_private_key_pem, parse_public_key_pem, public_key_to_pem};
use crate::error::{BaofuError, Result};
use rsa::{traits::PublicKeyParts, RsaPrivateKey, RsaPublicKey};
use std::fmt;
use std::path::Path;

#[derive(Clone, Default)]
pub struct KeyMaterial {
    private_key: Option<RsaPrivateKey>,
    public_key: Option<RsaPublicKey>,
    public_key_pem: Option<String>,
}

impl KeyMaterial {
    /// Assemble from already parsed parts. No consistency checks are made
    /// between `public_key` and `public_key_pem`.
    pub fn from_parts(
        private_key: Option<RsaPrivateKey>,
        public_key: Option<RsaPublicKey>,
        public_key_pem: Option<String>,
    ) -> Self {
        Self {
            private_key,
            public_key,
            public_key_pem,
        }
    }

    /// Assemble from parsed keys, deriving the `PUBLIC KEY` PEM.
    pub fn new(private_key: Option<RsaPrivateKey>, public_key: Option<RsaPublicKey>) -> Result<Self> {
        let public_key_pem = public_key.as_ref().map(public_key_to_pem).transpose()?;
        Ok(Self::from_parts(private_key, public_key, public_key_pem))
    }

    /// Parse a private key PEM and a public key / certificate PEM.
    ///
    /// A certificate is reduced to its public key, which is re-serialized as
    /// a plain `PUBLIC KEY` PEM.
    pub fn from_pem(private_pem: Option<&str>, public_pem: Option<&str>) -> Result<Self> {
        let private_key = private_pem.map(parse_private_key_pem).transpose()?;
        let public_key = public_pem.map(parse_public_key_pem).transpose()?;
        Self::new(private_key, public_key)
    }

    /// Read and parse key files. See [`KeyMaterial::from_pem`].
    pub fn from_files(private_path: Option<&Path>, public_path: Option<&Path>) -> Result<Self> {
        let private_pem = private_path.map(read_key_file).transpose()?;
        let public_pem = public_path.map(read_key_file).transpose()?;
        Self::from_pem(private_pem.as_deref(), public_pem.as_deref())
    }

    pub fn private_key(&self) -> Result<&RsaPrivateKey> {
        self.private_key.as_ref().ok_or(BaofuError::MissingPrivateKey)
    }

    pub fn public_key(&self) -> Result<&RsaPublicKey> {
        self.public_key.as_ref().ok_or(BaofuError::MissingPublicKey)
    }

    pub fn public_key_pem(&self) -> Result<&str> {
        self.public_key_pem
            .as_deref()
            .ok_or(BaofuError::MissingPublicKeyPem)
    }

    /// Public key together with its PEM form, as envelope decryption needs.
    pub fn public_key_with_pem(&self) -> Result<(&RsaPublicKey, &str)> {
        Ok((self.public_key()?, self.public_key_pem()?))
    }
}

fn read_key_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| BaofuError::KeyIo(format!("{}: {e}", path.display())))
}

// Never print key bytes.
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_key_bits", &self.private_key.as_ref().map(|k| k.size() * 8))
            .field("public_key_bits", &self.public_key.as_ref().map(|k| k.size() * 8))
            .field("public_key_pem", &self.public_key_pem.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const MERCHANT_PKCS8: &str = include_str!("../tests/fixtures/merchant_pkcs8.pem");
    const GATEWAY_CERT: &str = include_str!("../tests/fixtures/gateway.cer");

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_from_pem_with_certificate() {
        let keys = KeyMaterial::from_pem(Some(MERCHANT_PKCS8), Some(GATEWAY_CERT)).unwrap();

        assert_eq!(keys.private_key().unwrap().size(), 256);
        assert_eq!(keys.public_key().unwrap().size(), 256);
        assert!(keys
            .public_key_pem()
            .unwrap()
            .starts_with("-----BEGIN PUBLIC KEY-----"));
    }

    #[test]
    fn test_missing_parts() {
        let keys = KeyMaterial::default();

        assert_eq!(keys.private_key().unwrap_err(), BaofuError::MissingPrivateKey);
        assert_eq!(keys.public_key().unwrap_err(), BaofuError::MissingPublicKey);
        assert_eq!(
            keys.public_key_pem().unwrap_err(),
            BaofuError::MissingPublicKeyPem
        );

        let public_only = KeyMaterial::from_pem(None, Some(GATEWAY_CERT)).unwrap();
        assert!(public_only.public_key().is_ok());
        assert_eq!(public_only.private_key().unwrap_err().kind(), ErrorKind::Key);
    }

    #[test]
    fn test_public_key_with_pem() {
        let keys = KeyMaterial::from_pem(None, Some(GATEWAY_CERT)).unwrap();
        let (public_key, pem) = keys.public_key_with_pem().unwrap();
        assert_eq!(parse_public_key_pem(pem).unwrap(), *public_key);

        let without_pem = KeyMaterial::from_parts(None, keys.public_key().ok().cloned(), None);
        assert_eq!(
            without_pem.public_key_with_pem().unwrap_err(),
            BaofuError::MissingPublicKeyPem
        );
        assert_eq!(
            KeyMaterial::default().public_key_with_pem().unwrap_err(),
            BaofuError::MissingPublicKey
        );
    }

    #[test]
    fn test_from_files() {
        let keys = KeyMaterial::from_files(
            Some(fixture("merchant_pkcs1.pem").as_path()),
            Some(fixture("gateway.cer").as_path()),
        )
        .unwrap();
        assert!(keys.private_key().is_ok());
        assert!(keys.public_key_pem().is_ok());

        let err = KeyMaterial::from_files(Some(fixture("missing.pem").as_path()), None).unwrap_err();
        assert!(matches!(err, BaofuError::KeyIo(_)));
    }

    #[test]
    fn test_debug_hides_keys() {
        let keys = KeyMaterial::from_pem(Some(MERCHANT_PKCS8), Some(GATEWAY_CERT)).unwrap();
        let debug = format!("{keys:?}");

        assert!(debug.contains("private_key_bits: Some(2048)"));
        assert!(!debug.contains("BEGIN"));
        assert!(!debug.contains("BigUint"));
    }

    #[test]
    fn test_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<KeyMaterial>();
    }
}
