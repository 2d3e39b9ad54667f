use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Short fingerprint of an Ed25519 public key.
///
/// A `KeyId` is the first 16 hex characters of SHA-256 over the raw
/// 32-byte public key. It identifies which key produced a signature
/// without embedding the full key, and any holder of the public key can
/// re-derive it independently.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(String);

impl KeyId {
    /// Derive a `KeyId` from a raw 32-byte Ed25519 public key.
    pub fn derive(public_key: &[u8; 32]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(public_key);
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..8]))
    }

    /// The 16-character hex fingerprint.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self.0)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let pk = [7u8; 32];
        assert_eq!(KeyId::derive(&pk), KeyId::derive(&pk));
    }

    #[test]
    fn different_keys_produce_different_ids() {
        assert_ne!(KeyId::derive(&[1u8; 32]), KeyId::derive(&[2u8; 32]));
    }

    #[test]
    fn fingerprint_is_16_hex_chars() {
        let id = KeyId::derive(&[42u8; 32]);
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn serde_roundtrip() {
        let id = KeyId::derive(&[9u8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: KeyId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
