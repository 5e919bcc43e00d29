//! Baofu gateway SDK core library
//!
//! The gateway wraps request bodies in an envelope built from raw PKCS#1 v1.5
//! signature blocks and authenticates whole requests with SHA-256 RSA
//! signatures. This crate implements both codecs and the key loading they
//! depend on; HTTP transport is left to callers.

pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod txn;

// Re-exports
pub use config::ClientConfig;
pub use envelope::operations::{EnvelopeOps, VerifyMode};
pub use error::{BaofuError, ErrorKind, Result};
pub use keys::KeyMaterial;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
