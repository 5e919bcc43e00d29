//! Gateway envelope codec
//!
//! Encrypt: Base64 the plaintext, cut the Base64 text into segments of
//! `privateKeySize - 11` bytes, sign each segment with the raw PKCS#1 v1.5
//! transform and concatenate the hex of every block.
//!
//! Decrypt: cut the hex text into chunks of `publicKeySize * 8` hex
//! characters, hex decode each chunk, recover every modulus-sized block in
//! it with the public key, concatenate, then Base64 decode.
//!
//! NOTE: the two segment formulas are deliberately asymmetric. The encrypt
//! side counts Base64 bytes, the decrypt side counts hex characters and uses
//! a chunk of four whole blocks. Both must match the gateway exactly; do not
//! "fix" either one.
//!
//! The envelope carries no length header. Dropping whole trailing blocks can
//! still decode cleanly to a prefix of the plaintext, so a successful decrypt
//! does not prove the message arrived complete.

pub mod operations;

use crate::crypto::raw::{self, max_block_input};
use crate::error::{BaofuError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::{traits::PublicKeyParts, RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

/// Hex characters per decrypt chunk, per byte of modulus.
pub const DECRYPT_CHUNK_FACTOR: usize = 8;

/// Base64 bytes per encrypt segment for `key`.
pub fn encrypt_block_size(key: &RsaPrivateKey) -> Result<usize> {
    max_block_input(key.size()).ok_or(BaofuError::KeyTooSmall {
        modulus_bytes: key.size(),
    })
}

/// Hex characters per decrypt chunk for `key`.
pub fn decrypt_chunk_len(key: &RsaPublicKey) -> usize {
    key.size() * DECRYPT_CHUNK_FACTOR
}

/// Number of segments `len` units split into at `block_size` per segment.
pub fn segment_count(len: usize, block_size: usize) -> usize {
    if block_size == 0 {
        return 0;
    }
    len.div_ceil(block_size)
}

/// Encrypt `plaintext` into envelope hex.
pub fn encrypt(plaintext: &[u8], key: &RsaPrivateKey) -> Result<String> {
    let block_size = encrypt_block_size(key)?;
    let encoded = Zeroizing::new(STANDARD.encode(plaintext));
    let segments = segment_count(encoded.len(), block_size);

    let mut envelope = String::with_capacity(segments * key.size() * 2);
    for segment in encoded.as_bytes().chunks(block_size) {
        let block = raw::sign_block(key, segment)?;
        envelope.push_str(&hex::encode(block));
    }

    tracing::debug!(
        plaintext_len = plaintext.len(),
        encoded_len = encoded.len(),
        block_size,
        segments,
        "envelope encrypted"
    );
    Ok(envelope)
}

/// Decrypt envelope hex produced with the private half of `key`.
///
/// Any failing chunk aborts the whole decode; the error names the chunk.
pub fn decrypt(ciphertext_hex: &str, key: &RsaPublicKey) -> Result<Vec<u8>> {
    let ciphertext_hex = ciphertext_hex.trim();
    let block_len = key.size();
    let chunk_len = decrypt_chunk_len(key);
    if chunk_len == 0 {
        return Err(BaofuError::KeyTooSmall {
            modulus_bytes: block_len,
        });
    }

    let mut recovered = Zeroizing::new(Vec::with_capacity(ciphertext_hex.len() / 2));
    for (segment, chunk) in ciphertext_hex.as_bytes().chunks(chunk_len).enumerate() {
        let bytes = hex::decode(chunk).map_err(|_| BaofuError::SegmentHex { segment })?;
        if bytes.len() % block_len != 0 {
            return Err(BaofuError::BlockSizeMismatch {
                segment,
                len: bytes.len(),
                expected: block_len,
            });
        }

        for block in bytes.chunks(block_len) {
            let data = raw::recover_block(key, block).map_err(|e| BaofuError::Recovery {
                segment,
                reason: e.to_string(),
            })?;
            recovered.extend_from_slice(&data);
        }
    }

    let plaintext = STANDARD
        .decode(recovered.as_slice())
        .map_err(|e| BaofuError::PayloadBase64(e.to_string()))?;

    tracing::debug!(
        ciphertext_len = ciphertext_hex.len(),
        chunks = segment_count(ciphertext_hex.len(), chunk_len),
        plaintext_len = plaintext.len(),
        "envelope decrypted"
    );
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_keys;
    use rsa::BigUint;

    #[test]
    fn test_hello_world() {
        let private = test_keys::merchant_private();
        let public = test_keys::merchant_public();

        assert_eq!(STANDARD.encode(b"hello world"), "aGVsbG8gd29ybGQ=");
        assert_eq!(encrypt_block_size(&private).unwrap(), 245);

        let envelope = encrypt(b"hello world", &private).unwrap();
        assert_eq!(envelope.len(), 512);
        assert_eq!(
            envelope,
            include_str!("../../tests/fixtures/hello_world.envelope.hex").trim()
        );
        assert_eq!(decrypt(&envelope, &public).unwrap(), b"hello world");
    }

    #[test]
    fn test_deterministic() {
        let private = test_keys::merchant_private();
        let payload = br#"{"contractNo":"CM000001"}"#;

        assert_eq!(
            encrypt(payload, &private).unwrap(),
            encrypt(payload, &private).unwrap()
        );
    }

    #[test]
    fn test_empty() {
        let private = test_keys::merchant_private();
        let public = test_keys::merchant_public();

        let envelope = encrypt(b"", &private).unwrap();
        assert!(envelope.is_empty());
        assert!(decrypt(&envelope, &public).unwrap().is_empty());
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count(0, 245), 0);
        assert_eq!(segment_count(244, 245), 1);
        assert_eq!(segment_count(245, 245), 1);
        assert_eq!(segment_count(246, 245), 2);
        assert_eq!(segment_count(10, 0), 0);
    }

    #[test]
    fn test_multi_segment() {
        let private = test_keys::merchant_private();
        let public = test_keys::merchant_public();
        // 600 bytes -> 800 Base64 chars -> 4 segments
        let payload = vec![0x5au8; 600];

        let envelope = encrypt(&payload, &private).unwrap();
        assert_eq!(envelope.len(), 4 * 512);
        assert_eq!(decrypt(&envelope, &public).unwrap(), payload);
    }

    #[test]
    fn test_decrypt_chunk_spans_blocks() {
        let private = test_keys::merchant_private();
        let public = test_keys::merchant_public();
        assert_eq!(decrypt_chunk_len(&public), 2048);

        // 9 blocks: two full 4-block chunks and a 1-block tail
        let payload = vec![0x42u8; 1600];
        let envelope = encrypt(&payload, &private).unwrap();
        assert_eq!(envelope.len(), 9 * 512);
        assert_eq!(decrypt(&envelope, &public).unwrap(), payload);
    }

    #[test]
    fn test_dropped_trailing_block_decodes_prefix() {
        let private = test_keys::merchant_private();
        let public = test_keys::merchant_public();
        // 900 bytes -> 1200 Base64 chars -> blocks of 245 x4 plus a 220 tail
        let payload = vec![0x37u8; 900];

        let envelope = encrypt(&payload, &private).unwrap();
        assert_eq!(envelope.len(), 5 * 512);

        // 4 * 245 = 980 Base64 chars, a whole number of quanta
        let truncated = decrypt(&envelope[..4 * 512], &public).unwrap();
        assert_eq!(truncated, &payload[..735]);
    }

    #[test]
    fn test_trailing_newline_ignored() {
        let private = test_keys::merchant_private();
        let public = test_keys::merchant_public();

        let envelope = encrypt(b"ok", &private).unwrap();
        assert_eq!(decrypt(&format!("{envelope}\n"), &public).unwrap(), b"ok");
    }

    #[test]
    fn test_bad_hex() {
        let public = test_keys::merchant_public();
        let mut envelope = "00".repeat(256);
        envelope.replace_range(10..12, "zz");

        let err = decrypt(&envelope, &public).unwrap_err();
        assert_eq!(err, BaofuError::SegmentHex { segment: 0 });
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn test_truncated_block() {
        let private = test_keys::merchant_private();
        let public = test_keys::merchant_public();

        let envelope = encrypt(b"hello world", &private).unwrap();
        let err = decrypt(&envelope[..510], &public).unwrap_err();
        assert_eq!(
            err,
            BaofuError::BlockSizeMismatch {
                segment: 0,
                len: 255,
                expected: 256
            }
        );
    }

    #[test]
    fn test_wrong_key() {
        let private = test_keys::merchant_private();
        let other = test_keys::gateway_public();

        let envelope = encrypt(b"hello world", &private).unwrap();
        let err = decrypt(&envelope, &other).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn test_bad_base64_after_recovery() {
        let private = test_keys::merchant_private();
        let public = test_keys::merchant_public();

        // a valid block whose recovered text is not Base64
        let block = raw::sign_block(&private, b"not base64!").unwrap();
        let err = decrypt(&hex::encode(block), &public).unwrap_err();
        assert!(matches!(err, BaofuError::PayloadBase64(_)));
    }

    #[test]
    fn test_key_too_small() {
        // toy key: n = 61 * 53, a 2-byte modulus
        let key = RsaPrivateKey::from_components(
            BigUint::from(3233u32),
            BigUint::from(17u32),
            BigUint::from(2753u32),
            vec![BigUint::from(61u32), BigUint::from(53u32)],
        )
        .unwrap();

        let err = encrypt(b"x", &key).unwrap_err();
        assert_eq!(err, BaofuError::KeyTooSmall { modulus_bytes: 2 });
        assert_eq!(err.kind(), ErrorKind::Key);
    }
}
