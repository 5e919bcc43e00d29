//! Raw PKCS#1 v1.5 block transform
//!
//! The gateway "encrypts" by signing each block with the private key and no
//! DigestInfo prefix, and "decrypts" by running the public-key operation and
//! stripping the type 1 padding. Nothing in this module hashes its input.

use crate::error::{BaofuError, Result};
use rsa::{
    hazmat,
    traits::PublicKeyParts,
    BigUint, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
};
use thiserror::Error;

/// Framing bytes around each block: `00 01 PS 00` with `|PS| >= 8`.
pub const PADDING_OVERHEAD: usize = 11;

const MIN_PADDING_STRING: usize = 8;

/// Why a single block could not be recovered.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryFailure {
    #[error("block is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },

    #[error("block value is not below the modulus")]
    OutOfRange,

    #[error("not a type 1 block, key pair mismatch")]
    BlockType,

    #[error("malformed padding")]
    Padding,
}

/// Largest input [`sign_block`] accepts for a modulus of `modulus_bytes`,
/// or `None` if the key cannot carry even one byte.
pub fn max_block_input(modulus_bytes: usize) -> Option<usize> {
    modulus_bytes
        .checked_sub(PADDING_OVERHEAD)
        .filter(|size| *size >= 1)
}

/// Sign `data` as an opaque, already formatted digest.
///
/// Output is always exactly `key.size()` bytes.
pub fn sign_block(key: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>> {
    let mut rng = rand::thread_rng();
    key.sign_with_rng(&mut rng, Pkcs1v15Sign::new_unprefixed(), data)
        .map_err(|e| BaofuError::Signing(e.to_string()))
}

/// Recover the bytes signed into `block` using only the public key.
pub fn recover_block(
    key: &RsaPublicKey,
    block: &[u8],
) -> std::result::Result<Vec<u8>, RecoveryFailure> {
    let k = key.size();
    if block.len() != k {
        return Err(RecoveryFailure::Length {
            expected: k,
            actual: block.len(),
        });
    }

    let c = BigUint::from_bytes_be(block);
    if &c >= key.n() {
        return Err(RecoveryFailure::OutOfRange);
    }

    let m = hazmat::rsa_encrypt(key, &c).map_err(|_| RecoveryFailure::OutOfRange)?;
    let em = left_pad(&m.to_bytes_be(), k);
    strip_type1_padding(&em)
}

fn left_pad(bytes: &[u8], k: usize) -> Vec<u8> {
    let mut out = vec![0u8; k];
    let start = k.saturating_sub(bytes.len());
    out[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(k)..]);
    out
}

fn strip_type1_padding(em: &[u8]) -> std::result::Result<Vec<u8>, RecoveryFailure> {
    if em.len() < PADDING_OVERHEAD || em[0] != 0x00 || em[1] != 0x01 {
        return Err(RecoveryFailure::BlockType);
    }

    let body = &em[2..];
    let separator = body
        .iter()
        .position(|&b| b != 0xff)
        .ok_or(RecoveryFailure::Padding)?;
    if separator < MIN_PADDING_STRING || body[separator] != 0x00 {
        return Err(RecoveryFailure::Padding);
    }

    Ok(body[separator + 1..].to_vec())
}
