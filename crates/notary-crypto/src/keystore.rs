use std::fs;
use std::path::{Path, PathBuf};

use ed25519_dalek::pkcs8::spki::{DecodePublicKey, EncodePublicKey};
use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use tracing::{debug, info};

use crate::error::CryptoError;
use crate::signer::{SigningKey, VerifyingKey};

/// Load-or-generate persistence for the ledger's signing identity.
///
/// The private key is stored as PKCS#8 PEM readable only by the owner; the
/// public key as SPKI PEM, world-readable, so verification can run in a
/// separate process with only the public half. If both files exist they are
/// loaded; if neither exists a fresh keypair is generated and persisted.
/// Exactly one file present is an unrecoverable configuration error —
/// regenerating would silently replace an existing identity.
#[derive(Debug)]
pub struct Keystore {
    signing: SigningKey,
    private_path: PathBuf,
    public_path: PathBuf,
}

impl Keystore {
    /// Open the keystore at the given paths, generating a keypair on first use.
    pub fn load_or_generate(private_path: &Path, public_path: &Path) -> Result<Self, CryptoError> {
        match (private_path.exists(), public_path.exists()) {
            (true, true) => Self::load(private_path, public_path),
            (false, false) => Self::generate(private_path, public_path),
            (true, false) => Err(CryptoError::PartialKeyMaterial {
                present: private_path.to_path_buf(),
                missing: public_path.to_path_buf(),
            }),
            (false, true) => Err(CryptoError::PartialKeyMaterial {
                present: public_path.to_path_buf(),
                missing: private_path.to_path_buf(),
            }),
        }
    }

    /// Load the public half only, for standalone verification.
    pub fn load_public_key(public_path: &Path) -> Result<VerifyingKey, CryptoError> {
        let pem = fs::read_to_string(public_path)?;
        let key = ed25519_dalek::VerifyingKey::from_public_key_pem(&pem)
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
        Ok(VerifyingKey(key))
    }

    /// The private signing key. Never leaves this process.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    /// The public verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing.verifying_key()
    }

    /// Path to the private key PEM.
    pub fn private_path(&self) -> &Path {
        &self.private_path
    }

    /// Path to the public key PEM.
    pub fn public_path(&self) -> &Path {
        &self.public_path
    }

    fn load(private_path: &Path, public_path: &Path) -> Result<Self, CryptoError> {
        let pem = fs::read_to_string(private_path)?;
        let key = ed25519_dalek::SigningKey::from_pkcs8_pem(&pem)
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
        let signing = SigningKey(key);

        // The persisted public key must belong to the private key, otherwise
        // verification against the published half would fail for every record.
        let published = Self::load_public_key(public_path)?;
        if published != signing.verifying_key() {
            return Err(CryptoError::KeyPairMismatch);
        }

        debug!(
            key_id = %signing.verifying_key().key_id(),
            path = %private_path.display(),
            "loaded signing identity"
        );
        Ok(Self {
            signing,
            private_path: private_path.to_path_buf(),
            public_path: public_path.to_path_buf(),
        })
    }

    fn generate(private_path: &Path, public_path: &Path) -> Result<Self, CryptoError> {
        let signing = SigningKey::generate();

        if let Some(parent) = private_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if let Some(parent) = public_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let private_pem = signing
            .0
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
        let public_pem = signing
            .0
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;

        fs::write(private_path, private_pem.as_bytes())?;
        fs::write(public_path, public_pem.as_bytes())?;
        set_mode(private_path, 0o600)?;
        set_mode(public_path, 0o644)?;

        info!(
            key_id = %signing.verifying_key().key_id(),
            path = %private_path.display(),
            "generated new signing identity"
        );
        Ok(Self {
            signing,
            private_path: private_path.to_path_buf(),
            public_path: public_path.to_path_buf(),
        })
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), CryptoError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), CryptoError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(dir: &Path) -> (PathBuf, PathBuf) {
        (dir.join("notary.key"), dir.join("notary.pub.pem"))
    }

    #[test]
    fn generates_on_first_open() {
        let dir = tempfile::tempdir().unwrap();
        let (private, public) = paths(dir.path());

        let ks = Keystore::load_or_generate(&private, &public).unwrap();
        assert!(private.exists());
        assert!(public.exists());
        assert_eq!(ks.verifying_key().key_id().as_str().len(), 16);
    }

    #[test]
    fn identity_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let (private, public) = paths(dir.path());

        let first = Keystore::load_or_generate(&private, &public).unwrap();
        let second = Keystore::load_or_generate(&private, &public).unwrap();
        assert_eq!(first.verifying_key(), second.verifying_key());
    }

    #[test]
    fn public_half_verifies_independently() {
        let dir = tempfile::tempdir().unwrap();
        let (private, public) = paths(dir.path());

        let ks = Keystore::load_or_generate(&private, &public).unwrap();
        let sig = ks.signing_key().sign(b"chained bytes");

        let vk = Keystore::load_public_key(&public).unwrap();
        assert!(vk.verify(b"chained bytes", &sig).is_ok());
    }

    #[test]
    fn missing_public_key_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (private, public) = paths(dir.path());

        Keystore::load_or_generate(&private, &public).unwrap();
        fs::remove_file(&public).unwrap();

        let err = Keystore::load_or_generate(&private, &public).unwrap_err();
        assert!(matches!(err, CryptoError::PartialKeyMaterial { .. }));
    }

    #[test]
    fn missing_private_key_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (private, public) = paths(dir.path());

        Keystore::load_or_generate(&private, &public).unwrap();
        fs::remove_file(&private).unwrap();

        let err = Keystore::load_or_generate(&private, &public).unwrap_err();
        assert!(matches!(err, CryptoError::PartialKeyMaterial { .. }));
    }

    #[test]
    fn mismatched_pair_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (private, public) = paths(dir.path());
        Keystore::load_or_generate(&private, &public).unwrap();

        // Replace the public key with one from a different identity.
        let other = dir.path().join("other");
        let (other_private, other_public) = paths(&other);
        Keystore::load_or_generate(&other_private, &other_public).unwrap();
        fs::copy(&other_public, &public).unwrap();

        let err = Keystore::load_or_generate(&private, &public).unwrap_err();
        assert!(matches!(err, CryptoError::KeyPairMismatch));
    }

    #[cfg(unix)]
    #[test]
    fn private_key_is_owner_read_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let (private, public) = paths(dir.path());
        Keystore::load_or_generate(&private, &public).unwrap();

        let mode = fs::metadata(&private).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let mode = fs::metadata(&public).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
