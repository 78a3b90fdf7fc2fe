use serde::{Deserialize, Serialize};

use prov_crypto::BlockHasher;
use prov_types::{ActorSnapshot, BlockHash, EventTime, LifecycleAction, ListingId, Metadata};

use crate::error::LedgerError;

/// Metadata keys-of-convention.
///
/// The metadata mapping is open; these are the keys the surrounding
/// workflow actually writes, kept in one place so producers and consumers
/// agree on spelling.
pub mod meta {
    /// Trust score recorded at verification (opaque to the ledger).
    pub const TRUST_SCORE: &str = "trust_score";
    /// Material grade recorded at verification.
    pub const GRADE: &str = "grade";
    /// Price at purchase.
    pub const PRICE: &str = "price";
    /// Buyer account id at purchase.
    pub const BUYER_ID: &str = "buyer_id";
    /// Fields changed by an UPDATED event.
    pub const CHANGED_FIELDS: &str = "changed_fields";
    /// Free-form operator note.
    pub const NOTES: &str = "notes";
}

/// One immutable, hash-sealed record of a single lifecycle event.
///
/// Field declaration order is the canonical serialization order: the block
/// hash is BLAKE3 over the JSON form of this struct with `block_hash`
/// zeroed. Changing field order or names changes every hash and is a
/// breaking format change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Chain this block belongs to (partition key).
    pub listing_id: ListingId,
    /// 0 for genesis, +1 per subsequent block within the chain.
    pub sequence_number: u64,
    /// Hash of the preceding block; [`BlockHash::SENTINEL`] for genesis.
    pub previous_hash: BlockHash,
    /// What happened.
    pub action: LifecycleAction,
    /// Who did it, snapshotted at event time.
    pub actor: ActorSnapshot,
    /// When it happened; strictly increasing within a chain.
    pub timestamp: EventTime,
    /// Open key/value payload; participates in the hash input.
    pub metadata: Metadata,
    /// Digest sealing all of the above.
    pub block_hash: BlockHash,
}

impl Block {
    /// `true` for the first block of a chain.
    pub fn is_genesis(&self) -> bool {
        self.sequence_number == 0
    }

    /// Recompute the digest over this block's stored fields (excluding
    /// `block_hash`). For a non-tampered block this always reproduces the
    /// stored value.
    pub fn canonical_hash(&self) -> Result<BlockHash, LedgerError> {
        let mut canonical = self.clone();
        canonical.block_hash = BlockHash::SENTINEL;
        Ok(BlockHasher::BLOCK.hash_canonical(&canonical)?)
    }

    /// Seal the block: compute and store its hash. Used by the builder;
    /// stored blocks are never re-sealed.
    pub(crate) fn seal(mut self) -> Result<Self, LedgerError> {
        self.block_hash = self.canonical_hash()?;
        Ok(self)
    }
}
