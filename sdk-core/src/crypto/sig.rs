//! Request signatures
//!
//! Standard SHA-256 hash-then-sign with the DigestInfo prefix embedded, hex
//! encoded. Unlike the envelope transform this never recovers plaintext.

use crate::error::{BaofuError, Result};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// Sign `payload`, returning the lowercase hex signature.
pub fn sign(payload: &[u8], key: &RsaPrivateKey) -> Result<String> {
    let digest = Sha256::digest(payload);
    let mut rng = rand::thread_rng();
    let signature = key
        .sign_with_rng(&mut rng, Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|e| BaofuError::Signing(e.to_string()))?;

    Ok(hex::encode(signature))
}

/// Verify a hex signature over `payload`.
///
/// Only a malformed hex string is an error. Every failure inside the verify
/// primitive (wrong length, wrong key, tampered payload) is `Ok(false)`.
pub fn verify(payload: &[u8], signature_hex: &str, key: &RsaPublicKey) -> Result<bool> {
    let signature =
        hex::decode(signature_hex.trim()).map_err(|e| BaofuError::InvalidHex(e.to_string()))?;
    let digest = Sha256::digest(payload);

    Ok(key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &signature)
        .is_ok())
}
