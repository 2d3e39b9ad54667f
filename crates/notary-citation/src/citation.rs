use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notary_crypto::Signature;
use notary_types::{ChainHash, DocumentHash, KeyId};

/// Caller-supplied citation metadata.
pub type Meta = BTreeMap<String, serde_json::Value>;

/// A frozen, self-contained proof bundle for one document.
///
/// Everything a third party needs to verify the document's existence and
/// integrity: its hash, an Ed25519 signature over its raw bytes, the
/// signing key's fingerprint, and (when chaining succeeded) the custody
/// record that anchors it in the append-only ledger. Never mutated after
/// construction.
///
/// Degraded citations are visibly distinguishable: `custody_sequence` and
/// `custody_chain_hash` are `None` in memory and serialize as the `-1` /
/// empty-string sentinels of the original wire format, so a fully-chained
/// citation can never be confused with one that failed to chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationRecord {
    pub citation_id: Uuid,
    /// SHA-256 of the raw document bytes.
    pub document_hash: DocumentHash,
    /// Ed25519 signature over the raw document bytes.
    pub signature: Signature,
    pub key_id: KeyId,
    pub signed_at: String,
    pub doc_type: String,
    pub subject_id: String,
    /// Evidence-store row id; `None` (JSON `null`) when the store failed.
    pub evidence_id: Option<Uuid>,
    /// Custody record sequence number; `-1` on the wire when chaining failed.
    #[serde(with = "sequence_sentinel")]
    pub custody_sequence: Option<u64>,
    /// Custody record chain hash; empty string on the wire when chaining failed.
    #[serde(with = "chain_hash_sentinel")]
    pub custody_chain_hash: Option<ChainHash>,
    pub meta: Meta,
    /// Ordered, human-readable verification steps with concrete values.
    pub verification_instructions: Vec<String>,
}

impl CitationRecord {
    /// `true` when the custody-chain step failed and the citation carries
    /// only the document signature.
    pub fn is_degraded(&self) -> bool {
        self.custody_sequence.is_none()
    }
}

/// `Option<u64>` as the original `-1` sentinel.
mod sequence_sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(seq) => serializer.serialize_i64(*seq as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        if raw < 0 {
            Ok(None)
        } else {
            Ok(Some(raw as u64))
        }
    }
}

/// `Option<ChainHash>` as the original empty-string sentinel.
mod chain_hash_sentinel {
    use notary_types::ChainHash;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<ChainHash>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(hash) => serializer.serialize_str(&hash.to_hex()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ChainHash>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            Ok(None)
        } else {
            ChainHash::from_hex(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}
