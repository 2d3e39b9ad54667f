//! Citation service for the notary custody ledger.
//!
//! A citation wraps an arbitrary document's bytes into a self-contained,
//! independently verifiable proof bundle: the document is hashed and
//! signed, a custody event is chained in the ledger, an evidence copy is
//! optionally persisted through an injected store, and human-readable
//! verification instructions are emitted.
//!
//! Verification ([`verify_citation`]) needs only the document bytes, the
//! [`CitationRecord`], and the public key — no live service, no private
//! key, no ledger file.

pub mod audit;
pub mod citation;
pub mod error;
pub mod evidence;
pub mod service;
pub mod traits;
pub mod verify;

pub use audit::{AuditEvent, JsonlAuditLog, MemoryAudit};
pub use citation::{CitationRecord, Meta};
pub use error::CitationError;
pub use evidence::{EvidenceRow, EvidenceStoreError, JsonlEvidenceStore, MemoryEvidenceStore};
pub use service::{CitationConfig, CitationService};
pub use traits::{AuditSink, CustodyChain, EvidenceStore, Signer};
pub use verify::{verify_citation, CitationCheck, CitationVerification};
