use std::path::PathBuf;

/// Errors from key management and signing operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("key encoding error: {0}")]
    KeyEncoding(String),

    #[error(
        "partial key material: {present} exists but {missing} does not; \
         refusing to regenerate an existing identity"
    )]
    PartialKeyMaterial { present: PathBuf, missing: PathBuf },

    #[error("public key on disk does not belong to the private key")]
    KeyPairMismatch,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid key")]
    InvalidKey,

    #[error("invalid signature hex: {0}")]
    InvalidSignatureHex(String),
}
