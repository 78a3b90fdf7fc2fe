use std::fmt;

use prov_types::ListingId;

/// Why an append lost its slot.
///
/// Both reasons are the same benign race from the caller's point of view
/// (re-read the tail and retry), but they point at different writers: a
/// slot collision means someone appended past this writer, a stale tail
/// means the chain head moved between fetch and append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The block's sequence number is not the next free slot.
    SlotOccupied,
    /// The slot was free but `previous_hash` no longer matches the stored
    /// tail.
    StaleTail,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotOccupied => f.write_str("slot occupied"),
            Self::StaleTail => f.write_str("stale tail"),
        }
    }
}

/// Errors produced by ledger operations.
///
/// Caller errors (`InvalidAction`, `InvalidActor`, `ChainNotInitialized`,
/// `ChainAlreadyExists`) are surfaced immediately and never retried.
/// `SequenceConflict` is the one expected-to-be-transient error: it signals
/// a benign append race, and callers may retry after re-reading the tail.
/// Validator errors (`BrokenGenesis`, `SequenceGap`, `BrokenLink`,
/// `TamperedBlock`) mean the ledger's core guarantee has been violated;
/// they are never retried and never auto-repaired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("not a recognized lifecycle action: {0}")]
    InvalidAction(String),

    #[error("invalid actor snapshot: {reason}")]
    InvalidActor { reason: String },

    #[error("chain for {listing} is not initialized; record the CREATED genesis first")]
    ChainNotInitialized { listing: ListingId },

    #[error("chain for {listing} already exists")]
    ChainAlreadyExists { listing: ListingId },

    #[error("sequence conflict on {listing}: expected seq {expected}, got {actual} ({reason})")]
    SequenceConflict {
        listing: ListingId,
        expected: u64,
        actual: u64,
        reason: ConflictReason,
    },

    #[error("sequence gap at block {at}: expected seq {expected}")]
    SequenceGap { at: u64, expected: u64 },

    #[error("broken genesis block (seq {at})")]
    BrokenGenesis { at: u64 },

    #[error("broken hash link at block {at}")]
    BrokenLink { at: u64 },

    #[error("tampered block detected at seq {at}")]
    TamperedBlock { at: u64 },

    #[error("invalid sequence range: from={from}, to={to}")]
    InvalidRange { from: u64, to: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// `true` only for the benign append race a caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SequenceConflict { .. })
    }
}

impl From<prov_crypto::HasherError> for LedgerError {
    fn from(e: prov_crypto::HasherError) -> Self {
        Self::Serialization(e.to_string())
    }
}
