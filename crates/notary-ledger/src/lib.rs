//! Append-only custody ledger for the notary system.
//!
//! This crate is the heart of the notary. It provides:
//! - [`CustodyRecord`]: hash-chained, Ed25519-signed ledger entries
//! - [`CustodyLedger`]: the single-writer append cursor over a JSONL file
//! - [`verify_ledger`]: standalone chain verification needing only the
//!   ledger file and the public key
//!
//! Every byte of every record is independently re-derivable: the content
//! hash covers the record's own fields, the chain hash links it to its
//! predecessor, and the signature covers the chain hash's raw bytes.

pub mod error;
pub mod ledger;
pub mod record;
pub mod verify;

pub use error::LedgerError;
pub use ledger::{CustodyLedger, LedgerConfig};
pub use record::{compute_chain_hash, compute_content_hash, CustodyRecord, Payload, PrevHash};
pub use verify::{verify_ledger, BreakReason, ChainBreak, VerificationReport};
