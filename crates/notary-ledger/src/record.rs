use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use notary_crypto::Signature;
use notary_types::{ChainHash, DocumentHash};

use crate::error::LedgerError;

/// Caller-supplied record data. A `BTreeMap` keeps keys sorted, so the
/// canonical JSON used for hashing is deterministic.
pub type Payload = BTreeMap<String, serde_json::Value>;

/// Domain tag prepended to every record hash computation, so custody
/// hashes can never collide with other SHA-256 uses of the same bytes.
const DOMAIN_TAG: &[u8] = b"custody-record-v1:";

/// Wire sentinel for the first record's previous hash.
const GENESIS: &str = "GENESIS";

/// The previous record's chain hash, or the genesis sentinel.
///
/// Serialized as the literal string `"GENESIS"` for the first record and
/// as 64-character hex otherwise, matching the ledger wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrevHash {
    /// First record in the chain; there is no predecessor.
    Genesis,
    /// Chain hash of the immediately preceding record.
    Hash(ChainHash),
}

impl PrevHash {
    /// The bytes fed into the chain hash for this link.
    ///
    /// Raw 32 digest bytes for a real predecessor; the ASCII sentinel for
    /// genesis. The two can never collide because the lengths differ and
    /// every field is length-prefixed.
    fn hash_input(&self) -> Vec<u8> {
        match self {
            Self::Genesis => GENESIS.as_bytes().to_vec(),
            Self::Hash(h) => h.as_bytes().to_vec(),
        }
    }
}

impl fmt::Display for PrevHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genesis => write!(f, "{GENESIS}"),
            Self::Hash(h) => write!(f, "{h}"),
        }
    }
}

impl Serialize for PrevHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PrevHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == GENESIS {
            Ok(Self::Genesis)
        } else {
            ChainHash::from_hex(&s)
                .map(Self::Hash)
                .map_err(serde::de::Error::custom)
        }
    }
}

/// One custody ledger entry. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyRecord {
    /// Opaque identifier; not part of any hash.
    pub record_id: Uuid,
    /// Position in the chain; equals the record's line index in the file.
    pub sequence_no: u64,
    /// Capture time, RFC 3339 with millisecond precision. Stored as the
    /// exact string that was hashed.
    pub ts: String,
    /// Caller-supplied event name.
    pub event_type: String,
    /// Caller-supplied actor identifier.
    pub actor_id: String,
    /// Caller-supplied data, hashed in canonical (key-sorted) JSON form.
    pub payload: Payload,
    /// SHA-256 over (event type, actor, canonical payload, ts).
    pub content_hash: DocumentHash,
    /// The previous record's chain hash, or `"GENESIS"`.
    pub prev_hash: PrevHash,
    /// SHA-256 over (content hash, prev hash): the link in the chain.
    pub chain_hash: ChainHash,
    /// Ed25519 signature over the chain hash's raw 32 bytes.
    pub signature: Signature,
}

impl CustodyRecord {
    /// Recompute this record's content hash from its own fields.
    pub fn recompute_content_hash(&self) -> Result<DocumentHash, LedgerError> {
        compute_content_hash(&self.event_type, &self.actor_id, &self.payload, &self.ts)
    }

    /// Recompute this record's chain hash from its content and prev hashes.
    pub fn recompute_chain_hash(&self) -> ChainHash {
        compute_chain_hash(&self.content_hash, &self.prev_hash)
    }
}

/// Content hash of a record's own fields, independent of chain position.
///
/// Fields are length-prefixed (u64 little-endian) rather than joined with
/// a delimiter, so a field containing any particular byte sequence cannot
/// be confused with a field boundary.
pub fn compute_content_hash(
    event_type: &str,
    actor_id: &str,
    payload: &Payload,
    ts: &str,
) -> Result<DocumentHash, LedgerError> {
    let canonical_payload =
        serde_json::to_vec(payload).map_err(|e| LedgerError::Serialization(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_TAG);
    update_field(&mut hasher, event_type.as_bytes());
    update_field(&mut hasher, actor_id.as_bytes());
    update_field(&mut hasher, &canonical_payload);
    update_field(&mut hasher, ts.as_bytes());
    Ok(DocumentHash::from_hash(hasher.finalize().into()))
}

/// Chain hash linking a record to its predecessor.
pub fn compute_chain_hash(content_hash: &DocumentHash, prev_hash: &PrevHash) -> ChainHash {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_TAG);
    update_field(&mut hasher, content_hash.as_bytes());
    update_field(&mut hasher, &prev_hash.hash_input());
    ChainHash::from_hash(hasher.finalize().into())
}

fn update_field(hasher: &mut Sha256, field: &[u8]) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, &str)]) -> Payload {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect()
    }

    #[test]
    fn content_hash_is_deterministic() {
        let p = payload(&[("ip", "10.0.0.1")]);
        let ts = "2026-08-30T12:00:00.000Z";
        let h1 = compute_content_hash("LOGIN", "alice", &p, ts).unwrap();
        let h2 = compute_content_hash("LOGIN", "alice", &p, ts).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn content_hash_covers_every_field() {
        let p = payload(&[("ip", "10.0.0.1")]);
        let ts = "2026-08-30T12:00:00.000Z";
        let base = compute_content_hash("LOGIN", "alice", &p, ts).unwrap();

        assert_ne!(
            base,
            compute_content_hash("LOGOUT", "alice", &p, ts).unwrap()
        );
        assert_ne!(base, compute_content_hash("LOGIN", "bob", &p, ts).unwrap());
        assert_ne!(
            base,
            compute_content_hash("LOGIN", "alice", &Payload::new(), ts).unwrap()
        );
        assert_ne!(
            base,
            compute_content_hash("LOGIN", "alice", &p, "2026-08-30T12:00:00.001Z").unwrap()
        );
    }

    #[test]
    fn length_prefixing_prevents_field_boundary_ambiguity() {
        // With delimiter-joined inputs these two would hash identically.
        let p = Payload::new();
        let ts = "t";
        let a = compute_content_hash("AB", "C", &p, ts).unwrap();
        let b = compute_content_hash("A", "BC", &p, ts).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn payload_key_order_does_not_matter() {
        let ts = "2026-08-30T12:00:00.000Z";
        let p1 = payload(&[("a", "1"), ("b", "2")]);
        let p2 = payload(&[("b", "2"), ("a", "1")]);
        assert_eq!(
            compute_content_hash("E", "x", &p1, ts).unwrap(),
            compute_content_hash("E", "x", &p2, ts).unwrap()
        );
    }

    #[test]
    fn chain_hash_depends_on_prev() {
        let content = DocumentHash::from_bytes(b"content");
        let genesis = compute_chain_hash(&content, &PrevHash::Genesis);
        let linked = compute_chain_hash(
            &content,
            &PrevHash::Hash(ChainHash::from_bytes(b"predecessor")),
        );
        assert_ne!(genesis, linked);
    }

    #[test]
    fn prev_hash_serializes_as_sentinel_or_hex() {
        let genesis = serde_json::to_string(&PrevHash::Genesis).unwrap();
        assert_eq!(genesis, "\"GENESIS\"");

        let hash = ChainHash::from_bytes(b"x");
        let linked = serde_json::to_string(&PrevHash::Hash(hash)).unwrap();
        assert_eq!(linked, format!("\"{}\"", hash.to_hex()));

        let parsed: PrevHash = serde_json::from_str(&genesis).unwrap();
        assert_eq!(parsed, PrevHash::Genesis);
        let parsed: PrevHash = serde_json::from_str(&linked).unwrap();
        assert_eq!(parsed, PrevHash::Hash(hash));
    }

    #[test]
    fn record_wire_format_uses_camel_case() {
        let p = payload(&[("ip", "10.0.0.1")]);
        let ts = "2026-08-30T12:00:00.000Z".to_string();
        let content = compute_content_hash("LOGIN", "alice", &p, &ts).unwrap();
        let chain = compute_chain_hash(&content, &PrevHash::Genesis);
        let sk = notary_crypto::SigningKey::generate();

        let record = CustodyRecord {
            record_id: Uuid::new_v4(),
            sequence_no: 0,
            ts,
            event_type: "LOGIN".into(),
            actor_id: "alice".into(),
            payload: p,
            content_hash: content,
            prev_hash: PrevHash::Genesis,
            chain_hash: chain,
            signature: sk.sign(chain.as_bytes()),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("recordId").is_some());
        assert!(json.get("sequenceNo").is_some());
        assert!(json.get("eventType").is_some());
        assert!(json.get("actorId").is_some());
        assert!(json.get("contentHash").is_some());
        assert_eq!(json["prevHash"], "GENESIS");
        assert_eq!(json["signature"].as_str().unwrap().len(), 128);

        let parsed: CustodyRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }
}
