use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use notary_crypto::VerifyingKey;
use notary_types::{ChainHash, DocumentHash};

use crate::error::LedgerError;
use crate::record::{CustodyRecord, PrevHash};

/// Why verification stopped trusting the chain at a given record.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BreakReason {
    #[error("record is not valid JSON: {0}")]
    MalformedRecord(String),

    #[error("sequence gap: expected {expected}, got {actual}")]
    SequenceGap { expected: u64, actual: u64 },

    #[error("prev hash does not match the previous record's chain hash")]
    PrevHashMismatch,

    #[error("content hash does not match the record's own fields")]
    ContentHashMismatch,

    #[error("chain hash does not match (content hash, prev hash)")]
    ChainHashMismatch,

    #[error("signature over the chain hash does not verify")]
    SignatureInvalid,
}

/// The first point at which the chain could no longer be trusted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainBreak {
    /// Zero-based index (= sequence number) of the first untrusted record.
    pub seq: u64,
    pub reason: BreakReason,
}

/// Outcome of a full ledger walk.
///
/// Verification stops at the first failing record: once a link cannot be
/// trusted, every later record's linkage is meaningless, so records from
/// the break onward count as unverified rather than individually checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationReport {
    /// `true` when every record verified.
    pub valid: bool,
    /// Number of records (lines) in the file.
    pub total_records: u64,
    /// Number of records verified before the walk stopped.
    pub verified_records: u64,
    /// The first break, or `None` for a fully valid chain.
    pub first_broken_at: Option<ChainBreak>,
    /// The first verified record's content hash, for external pinning.
    pub chain_root: Option<DocumentHash>,
    /// The last verified record's chain hash, for external pinning.
    pub chain_head: Option<ChainHash>,
}

/// Walk a ledger file and verify the entire chain.
///
/// Pure and stateless: needs only the file and the public key, so it can
/// run in a separate process from the writer, concurrently with appends.
/// Data problems (tampering, forged signatures, malformed lines) are
/// reported in the result, never raised; only I/O failures are errors.
/// An absent or empty file is trivially valid with zero records.
pub fn verify_ledger(
    path: &Path,
    key: &VerifyingKey,
) -> Result<VerificationReport, LedgerError> {
    let lines = read_lines(path)?;
    let total_records = lines.len() as u64;

    let mut expected_prev = PrevHash::Genesis;
    let mut chain_root = None;
    let mut chain_head = None;
    let mut verified: u64 = 0;
    let mut first_broken_at = None;

    for (index, line) in lines.iter().enumerate() {
        let seq = index as u64;
        match check_record(line, seq, &expected_prev, key) {
            Ok(record) => {
                if index == 0 {
                    chain_root = Some(record.content_hash);
                }
                chain_head = Some(record.chain_hash);
                expected_prev = PrevHash::Hash(record.chain_hash);
                verified += 1;
            }
            Err(reason) => {
                first_broken_at = Some(ChainBreak { seq, reason });
                break;
            }
        }
    }

    Ok(VerificationReport {
        valid: first_broken_at.is_none(),
        total_records,
        verified_records: verified,
        first_broken_at,
        chain_root,
        chain_head,
    })
}

/// Run the per-record checks in order: sequence, linkage, content hash,
/// chain hash, signature. The first failure wins.
fn check_record(
    line: &str,
    seq: u64,
    expected_prev: &PrevHash,
    key: &VerifyingKey,
) -> Result<CustodyRecord, BreakReason> {
    let record: CustodyRecord =
        serde_json::from_str(line).map_err(|e| BreakReason::MalformedRecord(e.to_string()))?;

    if record.sequence_no != seq {
        return Err(BreakReason::SequenceGap {
            expected: seq,
            actual: record.sequence_no,
        });
    }

    if record.prev_hash != *expected_prev {
        return Err(BreakReason::PrevHashMismatch);
    }

    let content = record
        .recompute_content_hash()
        .map_err(|e| BreakReason::MalformedRecord(e.to_string()))?;
    if content != record.content_hash {
        return Err(BreakReason::ContentHashMismatch);
    }

    if record.recompute_chain_hash() != record.chain_hash {
        return Err(BreakReason::ChainHashMismatch);
    }

    if key
        .verify(record.chain_hash.as_bytes(), &record.signature)
        .is_err()
    {
        return Err(BreakReason::SignatureInvalid);
    }

    Ok(record)
}

fn read_lines(path: &Path) -> Result<Vec<String>, LedgerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut lines = Vec::new();
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}
