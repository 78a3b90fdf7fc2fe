use thiserror::Error;

use prov_ledger::LedgerError;

/// Errors from the durable chain store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(String),

    /// An interior frame failed its CRC or length check. Unlike a torn
    /// tail, this cannot be ignored: a hash chain with a hole in the middle
    /// is corrupt, not recoverable.
    #[error("corrupt log frame at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        LedgerError::Store(e.to_string())
    }
}
