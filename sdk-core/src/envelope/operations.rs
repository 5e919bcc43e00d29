//! High-level gateway operations bound to loaded key material

use crate::{
    config::ClientConfig,
    crypto::sig,
    envelope,
    error::{BaofuError, Result},
    keys::KeyMaterial,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How to treat a response whose signature does not verify.
///
/// Some gateway endpoints have been observed signing inconsistently, so
/// callers can opt into logging the mismatch instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    #[default]
    Strict,
    Lenient,
}

/// Envelope and signature operations over one shared [`KeyMaterial`].
///
/// Cloning is cheap; all clones share the same keys.
#[derive(Debug, Clone)]
pub struct EnvelopeOps {
    keys: Arc<KeyMaterial>,
    mode: VerifyMode,
}

impl EnvelopeOps {
    pub fn new(keys: KeyMaterial, mode: VerifyMode) -> Self {
        Self {
            keys: Arc::new(keys),
            mode,
        }
    }

    /// Load key files named by `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(config.load_key_material()?, config.verify_mode))
    }

    pub fn keys(&self) -> &KeyMaterial {
        &self.keys
    }

    pub fn mode(&self) -> VerifyMode {
        self.mode
    }

    /// Encrypt a request body with the merchant private key.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        envelope::encrypt(plaintext, self.keys.private_key()?)
    }

    /// Decrypt a gateway response with the gateway public key.
    pub fn decrypt(&self, ciphertext_hex: &str) -> Result<Vec<u8>> {
        let (public_key, _pem) = self.keys.public_key_with_pem()?;
        envelope::decrypt(ciphertext_hex, public_key)
    }

    /// Sign a request payload with the merchant private key.
    pub fn sign(&self, payload: &[u8]) -> Result<String> {
        sig::sign(payload, self.keys.private_key()?)
    }

    /// Verify a gateway signature. `Ok(false)` on mismatch in any mode.
    pub fn verify(&self, payload: &[u8], signature_hex: &str) -> Result<bool> {
        sig::verify(payload, signature_hex, self.keys.public_key()?)
    }

    /// Verify a gateway response signature according to [`VerifyMode`].
    ///
    /// Strict mode turns a mismatch into [`BaofuError::SignatureMismatch`];
    /// lenient mode logs it and returns `Ok(false)`. Key and hex errors
    /// propagate in both modes.
    pub fn check_response(&self, payload: &[u8], signature_hex: &str) -> Result<bool> {
        if self.verify(payload, signature_hex)? {
            return Ok(true);
        }

        match self.mode {
            VerifyMode::Strict => Err(BaofuError::SignatureMismatch),
            VerifyMode::Lenient => {
                tracing::warn!(
                    payload_len = payload.len(),
                    "response signature did not verify, continuing in lenient mode"
                );
                Ok(false)
            }
        }
    }
}
