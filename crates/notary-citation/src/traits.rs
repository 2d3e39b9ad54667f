use notary_crypto::{Signature, VerifyingKey};
use notary_ledger::{CustodyLedger, CustodyRecord, LedgerError, Payload};
use notary_types::KeyId;

use crate::audit::AuditEvent;
use crate::evidence::{EvidenceRow, EvidenceStoreError};

use uuid::Uuid;

/// Signing boundary: produces signatures under the ledger's identity
/// without exposing the private key.
pub trait Signer: Send + Sync {
    fn sign(&self, message: &[u8]) -> Signature;
    fn key_id(&self) -> KeyId;
    fn verifying_key(&self) -> VerifyingKey;
}

/// Custody-chain boundary: one append operation.
///
/// The citation service depends on this contract rather than the concrete
/// ledger so tests can inject a failing chain and exercise degraded mode.
pub trait CustodyChain: Send + Sync {
    fn record(
        &self,
        event_type: &str,
        actor_id: &str,
        payload: Payload,
    ) -> Result<CustodyRecord, LedgerError>;
}

/// Evidence-store boundary: one insert operation returning a row id.
/// The store's own persistence model is out of scope here.
pub trait EvidenceStore: Send + Sync {
    fn insert_evidence(&self, row: EvidenceRow) -> Result<Uuid, EvidenceStoreError>;
}

/// Audit boundary: fire-and-forget event sink. Implementations own their
/// durability; the caller never blocks on or fails from an audit write.
pub trait AuditSink: Send + Sync {
    fn write(&self, event: AuditEvent);
}

impl Signer for CustodyLedger {
    fn sign(&self, message: &[u8]) -> Signature {
        CustodyLedger::sign(self, message)
    }

    fn key_id(&self) -> KeyId {
        CustodyLedger::key_id(self)
    }

    fn verifying_key(&self) -> VerifyingKey {
        CustodyLedger::verifying_key(self)
    }
}

impl CustodyChain for CustodyLedger {
    fn record(
        &self,
        event_type: &str,
        actor_id: &str,
        payload: Payload,
    ) -> Result<CustodyRecord, LedgerError> {
        CustodyLedger::record(self, event_type, actor_id, payload)
    }
}
