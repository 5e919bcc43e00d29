//! RSA primitives used by the gateway protocol
//!
//! - [`raw`]: unhashed PKCS#1 v1.5 block transform (envelope building block)
//! - [`sig`]: SHA-256 PKCS#1 v1.5 request signatures
//! - [`keys`]: PEM / DER / X.509 key loading

pub mod keys;
pub mod raw;
pub mod sig;

pub use keys::{key_size_bytes, parse_private_key_pem, parse_public_key_pem, public_key_to_pem};
