//! PEM / DER / X.509 key loading

use crate::error::{BaofuError, Result};
use rsa::{
    pkcs1::{self, DecodeRsaPrivateKey, DecodeRsaPublicKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding, PrivateKeyInfo},
    traits::PublicKeyParts,
    RsaPrivateKey, RsaPublicKey,
};
use x509_cert::{
    der::{pem, Decode, Encode},
    spki::SubjectPublicKeyInfoRef,
    Certificate,
};

pub const LABEL_RSA_PRIVATE_KEY: &str = "RSA PRIVATE KEY";
pub const LABEL_PRIVATE_KEY: &str = "PRIVATE KEY";
pub const LABEL_CERTIFICATE: &str = "CERTIFICATE";
pub const LABEL_PUBLIC_KEY: &str = "PUBLIC KEY";
pub const LABEL_RSA_PUBLIC_KEY: &str = "RSA PUBLIC KEY";

/// Modulus size in bytes.
pub fn key_size_bytes<K: PublicKeyParts>(key: &K) -> usize {
    key.size()
}

fn decode_pem(pem_text: &str) -> Result<(&str, Vec<u8>)> {
    pem::decode_vec(pem_text.trim().as_bytes())
        .map_err(|e| BaofuError::InvalidPem(e.to_string()))
}

/// Parse a private key, trying PKCS#1 first and then PKCS#8.
///
/// The PEM label is not trusted; both encodings are attempted on the DER body.
pub fn parse_private_key_pem(pem_text: &str) -> Result<RsaPrivateKey> {
    let (label, der) = decode_pem(pem_text)?;

    if let Ok(key) = RsaPrivateKey::from_pkcs1_der(&der) {
        tracing::debug!(label, bits = key.size() * 8, "loaded PKCS#1 private key");
        return Ok(key);
    }

    let info = PrivateKeyInfo::try_from(der.as_slice())
        .map_err(|e| BaofuError::InvalidPem(format!("{label}: {e}")))?;
    if info.algorithm.oid != pkcs1::ALGORITHM_OID {
        return Err(BaofuError::UnsupportedKey(format!(
            "private key algorithm {}",
            info.algorithm.oid
        )));
    }

    let key = RsaPrivateKey::from_pkcs8_der(&der)
        .map_err(|e| BaofuError::InvalidPem(format!("{label}: {e}")))?;
    tracing::debug!(label, bits = key.size() * 8, "loaded PKCS#8 private key");
    Ok(key)
}

/// Parse a public key from a certificate, an SPKI `PUBLIC KEY` or a PKCS#1
/// `RSA PUBLIC KEY` container.
pub fn parse_public_key_pem(pem_text: &str) -> Result<RsaPublicKey> {
    let (label, der) = decode_pem(pem_text)?;

    let key = match label {
        LABEL_CERTIFICATE => {
            let cert = Certificate::from_der(&der)
                .map_err(|e| BaofuError::InvalidPem(format!("{label}: {e}")))?;
            let spki = cert
                .tbs_certificate
                .subject_public_key_info
                .to_der()
                .map_err(|e| BaofuError::InvalidPem(format!("{label}: {e}")))?;
            rsa_from_spki(&spki)?
        }
        LABEL_PUBLIC_KEY => rsa_from_spki(&der)?,
        LABEL_RSA_PUBLIC_KEY => RsaPublicKey::from_pkcs1_der(&der)
            .map_err(|e| BaofuError::InvalidPem(format!("{label}: {e}")))?,
        other => {
            return Err(BaofuError::InvalidPem(format!(
                "unexpected label {other:?} for a public key"
            )))
        }
    };

    tracing::debug!(label, bits = key.size() * 8, "loaded public key");
    Ok(key)
}

fn rsa_from_spki(der: &[u8]) -> Result<RsaPublicKey> {
    let spki = SubjectPublicKeyInfoRef::try_from(der)
        .map_err(|e| BaofuError::InvalidPem(e.to_string()))?;
    if spki.algorithm.oid != pkcs1::ALGORITHM_OID {
        return Err(BaofuError::UnsupportedKey(format!(
            "public key algorithm {}",
            spki.algorithm.oid
        )));
    }

    RsaPublicKey::from_public_key_der(der).map_err(|e| BaofuError::InvalidPem(e.to_string()))
}

/// Serialize a public key as an SPKI `PUBLIC KEY` PEM with LF line endings.
pub fn public_key_to_pem(key: &RsaPublicKey) -> Result<String> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| BaofuError::UnsupportedKey(e.to_string()))
}
