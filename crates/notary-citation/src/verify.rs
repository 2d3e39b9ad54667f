use notary_crypto::VerifyingKey;
use notary_types::DocumentHash;

use crate::citation::CitationRecord;

/// Name of the document-hash comparison check.
pub const HASH_MATCH: &str = "HASH_MATCH";
/// Name of the signature verification check.
pub const SIGNATURE_VALID: &str = "SIGNATURE_VALID";
/// Name of the key-fingerprint comparison check.
pub const KEY_ID_MATCH: &str = "KEY_ID_MATCH";

/// One named verification check with its expected and observed values,
/// so partial failure is diagnosable rather than a bare boolean.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CitationCheck {
    pub name: &'static str,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

/// Result of independently verifying a citation against document bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CitationVerification {
    /// `true` only when every individual check passed.
    pub valid: bool,
    pub checks: Vec<CitationCheck>,
}

impl CitationVerification {
    /// Look up an individual check by name.
    pub fn check(&self, name: &str) -> Option<&CitationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Verify a citation with nothing but the document bytes, the frozen
/// record, and the public key.
///
/// Pure: never errors on data problems — a tampered document or forged
/// signature is the answer being asked for, not an exceptional condition.
pub fn verify_citation(
    document: &[u8],
    citation: &CitationRecord,
    key: &VerifyingKey,
) -> CitationVerification {
    let mut checks = Vec::with_capacity(3);

    let computed_hash = DocumentHash::from_bytes(document);
    checks.push(CitationCheck {
        name: HASH_MATCH,
        passed: computed_hash == citation.document_hash,
        expected: citation.document_hash.to_hex(),
        actual: computed_hash.to_hex(),
    });

    let signature_ok = key.verify(document, &citation.signature).is_ok();
    checks.push(CitationCheck {
        name: SIGNATURE_VALID,
        passed: signature_ok,
        expected: "signature verifies over document bytes".into(),
        actual: if signature_ok {
            "verified".into()
        } else {
            "verification failed".into()
        },
    });

    let derived_key_id = key.key_id();
    checks.push(CitationCheck {
        name: KEY_ID_MATCH,
        passed: derived_key_id == citation.key_id,
        expected: citation.key_id.to_string(),
        actual: derived_key_id.to_string(),
    });

    CitationVerification {
        valid: checks.iter().all(|c| c.passed),
        checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::Meta;
    use notary_crypto::SigningKey;
    use uuid::Uuid;

    fn citation_for(document: &[u8], sk: &SigningKey) -> CitationRecord {
        CitationRecord {
            citation_id: Uuid::new_v4(),
            document_hash: DocumentHash::from_bytes(document),
            signature: sk.sign(document),
            key_id: sk.verifying_key().key_id(),
            signed_at: "2026-08-30T12:00:00.000Z".into(),
            doc_type: "REPORT".into(),
            subject_id: "case-1".into(),
            evidence_id: None,
            custody_sequence: Some(0),
            custody_chain_hash: None,
            meta: Meta::new(),
            verification_instructions: Vec::new(),
        }
    }

    #[test]
    fn original_bytes_verify() {
        let sk = SigningKey::generate();
        let doc = b"the cited document";
        let citation = citation_for(doc, &sk);

        let result = verify_citation(doc, &citation, &sk.verifying_key());
        assert!(result.valid);
        assert!(result.checks.iter().all(|c| c.passed));
        assert_eq!(result.checks.len(), 3);
    }

    #[test]
    fn single_byte_change_fails_hash_and_signature() {
        let sk = SigningKey::generate();
        let doc = b"the cited document".to_vec();
        let citation = citation_for(&doc, &sk);

        let mut altered = doc.clone();
        altered[0] ^= 0x01;

        let result = verify_citation(&altered, &citation, &sk.verifying_key());
        assert!(!result.valid);
        assert!(!result.check(HASH_MATCH).unwrap().passed);
        assert!(!result.check(SIGNATURE_VALID).unwrap().passed);
        assert!(result.check(KEY_ID_MATCH).unwrap().passed);
    }

    #[test]
    fn hash_check_reports_expected_and_actual() {
        let sk = SigningKey::generate();
        let citation = citation_for(b"original", &sk);

        let result = verify_citation(b"altered", &citation, &sk.verifying_key());
        let hash_check = result.check(HASH_MATCH).unwrap();
        assert_eq!(hash_check.expected, citation.document_hash.to_hex());
        assert_eq!(
            hash_check.actual,
            DocumentHash::from_bytes(b"altered").to_hex()
        );
        assert_ne!(hash_check.expected, hash_check.actual);
    }

    #[test]
    fn wrong_key_fails_signature_and_key_id() {
        let sk = SigningKey::generate();
        let doc = b"document";
        let citation = citation_for(doc, &sk);

        let other = SigningKey::generate().verifying_key();
        let result = verify_citation(doc, &citation, &other);
        assert!(!result.valid);
        // The hash still matches; only key-bound checks fail.
        assert!(result.check(HASH_MATCH).unwrap().passed);
        assert!(!result.check(SIGNATURE_VALID).unwrap().passed);
        assert!(!result.check(KEY_ID_MATCH).unwrap().passed);
    }
}
