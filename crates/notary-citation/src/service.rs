use std::path::PathBuf;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use notary_ledger::Payload;
use notary_types::DocumentHash;

use crate::audit::{event_types, AuditEvent};
use crate::citation::{CitationRecord, Meta};
use crate::error::CitationError;
use crate::evidence::EvidenceRow;
use crate::traits::{AuditSink, CustodyChain, EvidenceStore, Signer};

/// Service-level settings. Everything else is injected as a collaborator.
#[derive(Clone, Debug, Default)]
pub struct CitationConfig {
    /// When set, every citation is also written to
    /// `<receipt_dir>/<citation_id>.json` as a standalone receipt file.
    pub receipt_dir: Option<PathBuf>,
}

/// Issues citations: hash, sign, chain, store, instruct.
///
/// The collaborators are trait objects fixed at construction. Signing is
/// the only step that can abort a citation; custody-chain and
/// evidence-store failures degrade the record instead (sentinel fields,
/// an audit event, a warning) because a signed-but-unchained citation is
/// still worth returning to the caller.
pub struct CitationService {
    signer: Arc<dyn Signer>,
    chain: Arc<dyn CustodyChain>,
    evidence: Arc<dyn EvidenceStore>,
    audit: Arc<dyn AuditSink>,
    config: CitationConfig,
}

impl CitationService {
    pub fn new(
        signer: Arc<dyn Signer>,
        chain: Arc<dyn CustodyChain>,
        evidence: Arc<dyn EvidenceStore>,
        audit: Arc<dyn AuditSink>,
        config: CitationConfig,
    ) -> Self {
        Self {
            signer,
            chain,
            evidence,
            audit,
            config,
        }
    }

    /// Create and freeze a citation for `document`.
    pub fn cite(
        &self,
        document: &[u8],
        doc_type: &str,
        subject_id: &str,
        created_by: &str,
        meta: Meta,
    ) -> Result<CitationRecord, CitationError> {
        let citation_id = Uuid::new_v4();
        let signed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let document_hash = DocumentHash::from_hash(notary_crypto::sha256(document));
        let signature = self.signer.sign(document);
        let key_id = self.signer.key_id();

        let mut custody_payload = Payload::new();
        custody_payload.insert("citationId".into(), json!(citation_id));
        custody_payload.insert("documentHash".into(), json!(document_hash.to_hex()));
        custody_payload.insert("docType".into(), json!(doc_type));
        custody_payload.insert("subjectId".into(), json!(subject_id));
        custody_payload.insert("keyId".into(), json!(key_id.to_string()));
        custody_payload.insert("abbreviatedSignature".into(), json!(signature.short_hex()));

        let custody = match self
            .chain
            .record(event_types::CITATION_CREATED, created_by, custody_payload)
        {
            Ok(record) => Some((record.sequence_no, record.chain_hash)),
            Err(e) => {
                warn!(
                    citation_id = %citation_id,
                    error = %e,
                    "custody-chain append failed; issuing degraded citation"
                );
                self.audit.write(AuditEvent::new(
                    event_types::CUSTODY_APPEND_FAILED,
                    created_by,
                    json!({
                        "citation_id": citation_id,
                        "document_hash": document_hash.to_hex(),
                        "error": e.to_string(),
                    }),
                ));
                None
            }
        };

        let evidence_id = match self.evidence.insert_evidence(EvidenceRow {
            subject_id: subject_id.to_string(),
            doc_type: doc_type.to_string(),
            document_hash,
            signature: signature.clone(),
            public_key: hex::encode(self.signer.verifying_key().as_bytes()),
            meta: meta.clone(),
            created_by: created_by.to_string(),
        }) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(
                    citation_id = %citation_id,
                    error = %e,
                    "evidence-store insert failed; citation proceeds without evidence row"
                );
                self.audit.write(AuditEvent::new(
                    event_types::EVIDENCE_STORE_FAILED,
                    created_by,
                    json!({
                        "citation_id": citation_id,
                        "document_hash": document_hash.to_hex(),
                        "error": e.to_string(),
                    }),
                ));
                None
            }
        };

        let verification_instructions = Self::instructions(
            &document_hash,
            &hex::encode(self.signer.verifying_key().as_bytes()),
            &key_id.to_string(),
            custody.as_ref().map(|(seq, hash)| (*seq, hash.to_hex())),
            evidence_id,
        );

        let record = CitationRecord {
            citation_id,
            document_hash,
            signature,
            key_id: key_id.clone(),
            signed_at,
            doc_type: doc_type.to_string(),
            subject_id: subject_id.to_string(),
            evidence_id,
            custody_sequence: custody.as_ref().map(|(seq, _)| *seq),
            custody_chain_hash: custody.map(|(_, hash)| hash),
            meta,
            verification_instructions,
        };

        // A record that cannot serialize is worthless as a proof bundle.
        let receipt = serde_json::to_vec_pretty(&record)
            .map_err(|e| CitationError::Serialization(e.to_string()))?;
        if let Some(dir) = &self.config.receipt_dir {
            let path = dir.join(format!("{citation_id}.json"));
            if let Err(e) = std::fs::create_dir_all(dir)
                .and_then(|_| std::fs::write(&path, &receipt))
            {
                warn!(
                    citation_id = %citation_id,
                    path = %path.display(),
                    error = %e,
                    "receipt write failed; citation record is still valid"
                );
            }
        }

        self.audit.write(AuditEvent::new(
            event_types::CITATION_CREATED,
            created_by,
            json!({
                "citation_id": citation_id,
                "document_hash": document_hash.to_hex(),
                "key_id": key_id.to_string(),
                "custody_sequence": record.custody_sequence.map(|s| s as i64).unwrap_or(-1),
                "evidence_id": evidence_id,
            }),
        ));

        debug!(
            citation_id = %citation_id,
            degraded = record.is_degraded(),
            "citation issued"
        );
        Ok(record)
    }

    /// Ordered verification steps with the concrete values baked in, so
    /// the receipt is actionable without consulting the service.
    fn instructions(
        document_hash: &DocumentHash,
        public_key_hex: &str,
        key_id: &str,
        custody: Option<(u64, String)>,
        evidence_id: Option<Uuid>,
    ) -> Vec<String> {
        let mut steps = Vec::with_capacity(4);
        steps.push(format!(
            "1. Compute SHA-256 over the raw document bytes; the digest must equal {}.",
            document_hash.to_hex()
        ));
        steps.push(format!(
            "2. Verify the Ed25519 signature against the raw document bytes using \
             public key {public_key_hex} (key id {key_id})."
        ));
        let mut step = 3;
        match custody {
            Some((seq, chain_hash)) => {
                steps.push(format!(
                    "{step}. Fetch custody record #{seq} from the ledger and confirm \
                     its chain hash equals {chain_hash}."
                ));
                step += 1;
            }
            None => {
                steps.push(format!(
                    "{step}. Custody chaining failed at citation time; this citation \
                     is backed by the signature alone."
                ));
                step += 1;
            }
        }
        if let Some(id) = evidence_id {
            steps.push(format!(
                "{step}. Fetch evidence row {id} and confirm its stored hash and \
                 signature match this citation."
            ));
        }
        steps
    }
}
