/// Errors that abort a citation entirely.
///
/// Only the fatal tier surfaces here: a citation with no valid signature
/// has no value. Custody-chain and evidence-store failures are contained
/// inside `cite` and represented as sentinel fields on the returned
/// record instead.
#[derive(Debug, thiserror::Error)]
pub enum CitationError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
