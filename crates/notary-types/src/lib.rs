//! Foundation types for the notary custody ledger.
//!
//! This crate provides the hash and identity types used throughout the
//! notary system. Every other notary crate depends on `notary-types`.
//!
//! # Key Types
//!
//! - [`DocumentHash`] — SHA-256 content hash of a record's own fields or a
//!   cited document's bytes
//! - [`ChainHash`] — SHA-256 link hash binding a record to its predecessor
//! - [`KeyId`] — Short fingerprint of an Ed25519 public key

pub mod error;
pub mod hash;
pub mod keyid;

pub use error::TypeError;
pub use hash::{ChainHash, DocumentHash};
pub use keyid::KeyId;
