use prov_types::ListingId;

use crate::block::Block;
use crate::error::LedgerError;

/// Storage boundary for the provenance ledger.
///
/// Append-only persistence of blocks partitioned by listing. There is
/// deliberately no update or delete operation on this trait: once appended,
/// a block is permanent.
///
/// `append` must be atomic per listing: of two concurrent appends for the
/// same sequence slot, at most one succeeds and the other fails with
/// [`LedgerError::SequenceConflict`].
pub trait ChainStore: Send + Sync {
    /// Append a sealed block.
    ///
    /// Fails with `SequenceConflict` unless `block.sequence_number` is
    /// exactly the current chain length for its listing and
    /// `block.previous_hash` matches the stored tail hash (sentinel for an
    /// empty chain).
    fn append(&self, block: Block) -> Result<(), LedgerError>;

    /// The highest-sequence block of a listing, or `None` if the chain does
    /// not exist yet.
    fn latest(&self, listing: &ListingId) -> Result<Option<Block>, LedgerError>;

    /// All blocks of a listing, ascending by sequence number.
    fn blocks(&self, listing: &ListingId) -> Result<Vec<Block>, LedgerError>;

    /// Blocks at chain positions `[from, to)`, ascending. A restartable
    /// page fetch so long chains can be walked without loading everything
    /// at once.
    fn read_range(
        &self,
        listing: &ListingId,
        from: u64,
        to: u64,
    ) -> Result<Vec<Block>, LedgerError>;

    /// Number of blocks appended for a listing (0 if no chain).
    fn chain_len(&self, listing: &ListingId) -> Result<u64, LedgerError>;

    /// All listings with at least one block, in stable order.
    fn listings(&self) -> Result<Vec<ListingId>, LedgerError>;
}
