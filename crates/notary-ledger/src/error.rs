use notary_crypto::CryptoError;

/// Errors produced by ledger operations.
///
/// Data problems found during verification (tampered hashes, bad
/// signatures) are not errors; they are reported through
/// [`crate::VerificationReport`]. `LedgerError` covers only the cases
/// where the ledger itself cannot operate.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("key error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt ledger at line {line}: {reason}")]
    CorruptLedger { line: usize, reason: String },
}
