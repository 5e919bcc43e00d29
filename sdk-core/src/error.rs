//! Baofu SDK error types

use thiserror::Error;

/// Coarse error taxonomy callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unusable key material. Not retryable.
    Key,
    /// Malformed caller input (hex, config documents).
    Format,
    /// Segment recovery or final decode failed, usually a key mismatch
    /// between the two parties or a corrupted message.
    Crypto,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BaofuError {
    #[error("Private key is not loaded")]
    MissingPrivateKey,

    #[error("Public key is not loaded")]
    MissingPublicKey,

    #[error("Public key PEM is not loaded")]
    MissingPublicKeyPem,

    #[error("Invalid PEM: {0}")]
    InvalidPem(String),

    #[error("Unsupported key: {0}")]
    UnsupportedKey(String),

    #[error("Key too small for envelope encryption: {modulus_bytes}-byte modulus")]
    KeyTooSmall { modulus_bytes: usize },

    #[error("Key file error: {0}")]
    KeyIo(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Hex decode failed in segment {segment}")]
    SegmentHex { segment: usize },

    #[error("Segment {segment} is {len} bytes, not a multiple of the {expected}-byte block")]
    BlockSizeMismatch {
        segment: usize,
        len: usize,
        expected: usize,
    },

    #[error("Block recovery failed in segment {segment}: {reason}")]
    Recovery { segment: usize, reason: String },

    #[error("Recovered payload is not valid Base64: {0}")]
    PayloadBase64(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Signature mismatch")]
    SignatureMismatch,
}

impl BaofuError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingPrivateKey
            | Self::MissingPublicKey
            | Self::MissingPublicKeyPem
            | Self::InvalidPem(_)
            | Self::UnsupportedKey(_)
            | Self::KeyTooSmall { .. }
            | Self::KeyIo(_) => ErrorKind::Key,
            Self::InvalidHex(_) | Self::InvalidConfig(_) => ErrorKind::Format,
            Self::SegmentHex { .. }
            | Self::BlockSizeMismatch { .. }
            | Self::Recovery { .. }
            | Self::PayloadBase64(_)
            | Self::Signing(_)
            | Self::SignatureMismatch => ErrorKind::Crypto,
        }
    }
}

pub type Result<T> = std::result::Result<T, BaofuError>;
