//! Cryptographic primitives for the notary custody ledger.
//!
//! Provides SHA-256 digest helpers, Ed25519 signing/verification, and
//! load-or-generate PEM key persistence.
//!
//! All crypto operations wrap established libraries — no custom cryptography.

pub mod digest;
pub mod error;
pub mod keystore;
pub mod signer;

pub use digest::{sha256, sha256_file};
pub use error::CryptoError;
pub use keystore::Keystore;
pub use signer::{Signature, SigningKey, VerifyingKey};
