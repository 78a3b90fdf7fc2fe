use prov_ledger::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the service façade.
///
/// Ledger errors pass through unchanged so callers can match on the full
/// taxonomy; `Exhausted` is added by the retry loop when a listing stays
/// contended past the attempt budget.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("append on {listing} still conflicting after {attempts} attempts")]
    Exhausted { listing: prov_types::ListingId, attempts: u32 },
}

impl ServiceError {
    /// The underlying ledger error, if this wraps one.
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(e) => Some(e),
            Self::Exhausted { .. } => None,
        }
    }
}
