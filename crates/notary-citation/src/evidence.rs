use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notary_crypto::Signature;
use notary_types::DocumentHash;

use crate::citation::Meta;
use crate::traits::EvidenceStore;

/// Everything an evidence store needs to persist a verifiable copy of a
/// citation: hash, signature, public key, and caller metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRow {
    pub subject_id: String,
    pub doc_type: String,
    pub document_hash: DocumentHash,
    pub signature: Signature,
    /// Hex-encoded Ed25519 public key, so a stored row verifies on its own.
    pub public_key: String,
    pub meta: Meta,
    pub created_by: String,
}

/// Errors from evidence-store implementations.
#[derive(Debug, thiserror::Error)]
pub enum EvidenceStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// On-disk shape of a stored evidence row: the row plus id and timestamp.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEvidence {
    id: Uuid,
    created_at: String,
    #[serde(flatten)]
    row: EvidenceRow,
}

/// File-backed evidence store: append-only JSONL, one row per insert.
pub struct JsonlEvidenceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlEvidenceStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EvidenceStore for JsonlEvidenceStore {
    fn insert_evidence(&self, row: EvidenceRow) -> Result<Uuid, EvidenceStoreError> {
        let id = Uuid::new_v4();
        let stored = StoredEvidence {
            id,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            row,
        };
        let mut line = serde_json::to_vec(&stored)
            .map_err(|e| EvidenceStoreError::Serialization(e.to_string()))?;
        line.push(b'\n');

        let _guard = self.lock.lock().expect("evidence mutex poisoned");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        Ok(id)
    }
}

/// In-memory evidence store for tests and embedding.
#[derive(Default)]
pub struct MemoryEvidenceStore {
    rows: Mutex<Vec<(Uuid, EvidenceRow)>>,
}

impl MemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored row by id.
    pub fn get(&self, id: Uuid) -> Option<EvidenceRow> {
        self.rows
            .lock()
            .expect("evidence mutex poisoned")
            .iter()
            .find(|(row_id, _)| *row_id == id)
            .map(|(_, row)| row.clone())
    }

    /// Number of rows inserted.
    pub fn len(&self) -> usize {
        self.rows.lock().expect("evidence mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EvidenceStore for MemoryEvidenceStore {
    fn insert_evidence(&self, row: EvidenceRow) -> Result<Uuid, EvidenceStoreError> {
        let id = Uuid::new_v4();
        self.rows
            .lock()
            .expect("evidence mutex poisoned")
            .push((id, row));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notary_crypto::SigningKey;

    fn sample_row() -> EvidenceRow {
        let sk = SigningKey::generate();
        EvidenceRow {
            subject_id: "case-6183".into(),
            doc_type: "INVOICE".into(),
            document_hash: DocumentHash::from_bytes(b"document"),
            signature: sk.sign(b"document"),
            public_key: hex::encode(sk.verifying_key().as_bytes()),
            meta: Meta::new(),
            created_by: "ingest".into(),
        }
    }

    #[test]
    fn memory_store_returns_retrievable_id() {
        let store = MemoryEvidenceStore::new();
        let row = sample_row();
        let id = store.insert_evidence(row.clone()).unwrap();
        assert_eq!(store.get(id), Some(row));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn jsonl_store_appends_rows_with_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evidence.jsonl");
        let store = JsonlEvidenceStore::new(&path);

        let id1 = store.insert_evidence(sample_row()).unwrap();
        let id2 = store.insert_evidence(sample_row()).unwrap();
        assert_ne!(id1, id2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["id"].as_str().unwrap(), id1.to_string());
        assert_eq!(parsed["subjectId"], "case-6183");
        assert_eq!(parsed["documentHash"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn jsonl_store_propagates_io_failure() {
        // The parent directory does not exist.
        let store = JsonlEvidenceStore::new(Path::new("/nonexistent/evidence.jsonl"));
        assert!(matches!(
            store.insert_evidence(sample_row()),
            Err(EvidenceStoreError::Io(_))
        ));
    }
}
