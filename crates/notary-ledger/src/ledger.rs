use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

use notary_crypto::{Keystore, Signature, VerifyingKey};
use notary_types::KeyId;

use crate::error::LedgerError;
use crate::record::{compute_chain_hash, compute_content_hash, CustodyRecord, Payload, PrevHash};

/// File locations for a custody ledger and its signing identity.
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Append-only JSONL ledger file.
    pub ledger_path: PathBuf,
    /// PKCS#8 PEM private key, owner-read-only.
    pub private_key_path: PathBuf,
    /// SPKI PEM public key, world-readable.
    pub public_key_path: PathBuf,
}

impl LedgerConfig {
    /// Conventional layout: all three files side by side in one directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            ledger_path: dir.join("custody.jsonl"),
            private_key_path: dir.join("notary.key"),
            public_key_path: dir.join("notary.pub.pem"),
        }
    }
}

/// Internal write cursor. The next record's sequence number and the chain
/// link it must carry, plus the open append handle. All three live behind
/// one mutex so a `record` call's read-modify-write cannot interleave with
/// another's.
#[derive(Debug)]
struct Cursor {
    sequence_no: u64,
    prev_hash: PrevHash,
    writer: BufWriter<File>,
}

/// Append-only, hash-chained, per-record-signed custody ledger.
///
/// Single-writer: one instance owns the cursor and the file. On open the
/// cursor resumes from the existing file contents, so the ledger survives
/// process restarts without external coordination. Verification does not
/// need an instance at all — see [`crate::verify_ledger`].
#[derive(Debug)]
pub struct CustodyLedger {
    keystore: Keystore,
    path: PathBuf,
    cursor: Mutex<Cursor>,
}

impl CustodyLedger {
    /// Open (or create) the ledger described by `config`.
    ///
    /// Loads the signing identity (generating it on first use) and scans
    /// the ledger file to resume the cursor: a file with `N` records
    /// resumes at sequence `N` with the last record's chain hash as the
    /// pending link. Key failures and unreadable ledger files are fatal.
    pub fn open(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let keystore =
            Keystore::load_or_generate(&config.private_key_path, &config.public_key_path)?;

        let (sequence_no, prev_hash) = Self::scan(&config.ledger_path)?;

        if let Some(parent) = config.ledger_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.ledger_path)?;

        debug!(
            path = %config.ledger_path.display(),
            resume_seq = sequence_no,
            key_id = %keystore.verifying_key().key_id(),
            "custody ledger opened"
        );

        Ok(Self {
            keystore,
            path: config.ledger_path.clone(),
            cursor: Mutex::new(Cursor {
                sequence_no,
                prev_hash,
                writer: BufWriter::new(file),
            }),
        })
    }

    /// Append a signed custody record and return it.
    ///
    /// The append must durably succeed before the cursor advances; a failed
    /// write leaves the in-memory cursor exactly where it was, so the next
    /// attempt re-uses the same sequence number and chain link.
    pub fn record(
        &self,
        event_type: &str,
        actor_id: &str,
        payload: Payload,
    ) -> Result<CustodyRecord, LedgerError> {
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut cursor = self.cursor.lock().expect("ledger mutex poisoned");

        let content_hash = compute_content_hash(event_type, actor_id, &payload, &ts)?;
        let chain_hash = compute_chain_hash(&content_hash, &cursor.prev_hash);
        let signature = self.keystore.signing_key().sign(chain_hash.as_bytes());

        let record = CustodyRecord {
            record_id: Uuid::new_v4(),
            sequence_no: cursor.sequence_no,
            ts,
            event_type: event_type.to_string(),
            actor_id: actor_id.to_string(),
            payload,
            content_hash,
            prev_hash: cursor.prev_hash,
            chain_hash,
            signature,
        };

        let mut line =
            serde_json::to_vec(&record).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        line.push(b'\n');
        cursor.writer.write_all(&line)?;
        cursor.writer.flush()?;
        cursor.writer.get_ref().sync_all()?;

        // The write is durable; only now may the cursor move.
        cursor.sequence_no += 1;
        cursor.prev_hash = PrevHash::Hash(chain_hash);

        debug!(
            seq = record.sequence_no,
            event_type,
            chain = %chain_hash.short_hex(),
            "custody record appended"
        );
        Ok(record)
    }

    /// Sign arbitrary bytes under the ledger's signing identity.
    ///
    /// Used by the citation service so the private key never leaves the
    /// ledger instance.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.keystore.signing_key().sign(message)
    }

    /// The public half of the signing identity.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.keystore.verifying_key()
    }

    /// Fingerprint of the signing key.
    pub fn key_id(&self) -> KeyId {
        self.keystore.verifying_key().key_id()
    }

    /// Path to the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sequence number the next record will receive.
    pub fn next_sequence(&self) -> u64 {
        self.cursor.lock().expect("ledger mutex poisoned").sequence_no
    }

    /// Read back all records currently in the ledger file.
    pub fn read_all(&self) -> Result<Vec<CustodyRecord>, LedgerError> {
        let mut records = Vec::new();
        if !self.path.exists() {
            return Ok(records);
        }
        for (index, line) in BufReader::new(File::open(&self.path)?).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: CustodyRecord =
                serde_json::from_str(&line).map_err(|e| LedgerError::CorruptLedger {
                    line: index,
                    reason: e.to_string(),
                })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Derive the resume cursor from the existing ledger file.
    fn scan(path: &Path) -> Result<(u64, PrevHash), LedgerError> {
        if !path.exists() {
            return Ok((0, PrevHash::Genesis));
        }

        let mut count: u64 = 0;
        let mut prev = PrevHash::Genesis;
        for (index, line) in BufReader::new(File::open(path)?).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: CustodyRecord =
                serde_json::from_str(&line).map_err(|e| LedgerError::CorruptLedger {
                    line: index,
                    reason: e.to_string(),
                })?;
            count += 1;
            prev = PrevHash::Hash(record.chain_hash);
        }
        Ok((count, prev))
    }
}
