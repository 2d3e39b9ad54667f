use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::traits::AuditSink;

/// Canonical audit event types emitted by the citation service.
pub mod event_types {
    /// A citation was created and frozen.
    pub const CITATION_CREATED: &str = "CITATION_CREATED";
    /// The custody-chain append failed; the citation proceeded degraded.
    pub const CUSTODY_APPEND_FAILED: &str = "CUSTODY_APPEND_FAILED";
    /// The evidence-store insert failed; the citation proceeded without it.
    pub const EVIDENCE_STORE_FAILED: &str = "EVIDENCE_STORE_FAILED";
}

/// A single audit event: one JSON line in the audit log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub ts: String,
    pub event_type: String,
    pub actor: String,
    pub payload: serde_json::Value,
}

impl AuditEvent {
    pub fn new(event_type: &str, actor: &str, payload: serde_json::Value) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event_type: event_type.to_string(),
            actor: actor.to_string(),
            payload,
        }
    }
}

/// File-backed audit log: append-only JSONL.
///
/// Write failures are logged and swallowed; audit is fire-and-forget and
/// must never block or fail a citation.
pub struct JsonlAuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlAuditLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, event: &AuditEvent) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(event)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        line.push(b'\n');

        let _guard = self.lock.lock().expect("audit mutex poisoned");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)
    }
}

impl AuditSink for JsonlAuditLog {
    fn write(&self, event: AuditEvent) {
        if let Err(e) = self.append(&event) {
            warn!(
                event_type = %event.event_type,
                error = %e,
                "audit write failed; event dropped"
            );
        }
    }
}

/// In-memory audit sink for tests and embedding.
#[derive(Default)]
pub struct MemoryAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events written so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }

    /// Event types written so far, in order.
    pub fn event_types(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }
}

impl AuditSink for MemoryAudit {
    fn write(&self, event: AuditEvent) {
        self.events.lock().expect("audit mutex poisoned").push(event);
    }
}
