use std::collections::HashMap;
use std::sync::RwLock;

use prov_types::{BlockHash, ListingId};
use tracing::debug;

use crate::block::Block;
use crate::error::{ConflictReason, LedgerError};
use crate::traits::ChainStore;

/// In-memory chain store for tests, local demos, and embedding.
///
/// One vector of blocks per listing behind a single `RwLock`; the
/// check-then-append runs entirely under the write lock, which makes the
/// conditional append atomic.
#[derive(Default)]
pub struct InMemoryChainStore {
    inner: RwLock<HashMap<ListingId, Vec<Block>>>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<ListingId, Vec<Block>>>, LedgerError> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Store("chain store read lock poisoned".into()))
    }

    /// Test-only escape hatch for tamper-detection tests. Not part of the
    /// store contract; production code has no way to reach stored blocks
    /// mutably.
    #[cfg(test)]
    pub(crate) fn corrupt_block_for_test(
        &self,
        listing: &ListingId,
        seq: usize,
        f: impl FnOnce(&mut Block),
    ) {
        let mut state = self.inner.write().unwrap();
        let chain = state.get_mut(listing).unwrap();
        f(&mut chain[seq]);
    }
}

impl ChainStore for InMemoryChainStore {
    fn append(&self, block: Block) -> Result<(), LedgerError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| LedgerError::Store("chain store write lock poisoned".into()))?;

        let chain = state.entry(block.listing_id).or_default();
        let expected = chain.len() as u64;
        if block.sequence_number != expected {
            return Err(LedgerError::SequenceConflict {
                listing: block.listing_id,
                expected,
                actual: block.sequence_number,
                reason: ConflictReason::SlotOccupied,
            });
        }

        let tail_hash = chain
            .last()
            .map(|b| b.block_hash)
            .unwrap_or(BlockHash::SENTINEL);
        if block.previous_hash != tail_hash {
            return Err(LedgerError::SequenceConflict {
                listing: block.listing_id,
                expected,
                actual: block.sequence_number,
                reason: ConflictReason::StaleTail,
            });
        }

        debug!(
            listing = %block.listing_id,
            seq = block.sequence_number,
            action = %block.action,
            "append block"
        );
        chain.push(block);
        Ok(())
    }

    fn latest(&self, listing: &ListingId) -> Result<Option<Block>, LedgerError> {
        let state = self.read()?;
        Ok(state.get(listing).and_then(|chain| chain.last()).cloned())
    }

    fn blocks(&self, listing: &ListingId) -> Result<Vec<Block>, LedgerError> {
        let state = self.read()?;
        Ok(state.get(listing).cloned().unwrap_or_default())
    }

    fn read_range(
        &self,
        listing: &ListingId,
        from: u64,
        to: u64,
    ) -> Result<Vec<Block>, LedgerError> {
        if from > to {
            return Err(LedgerError::InvalidRange { from, to });
        }
        let state = self.read()?;
        let Some(chain) = state.get(listing) else {
            return Ok(vec![]);
        };
        let start = (from as usize).min(chain.len());
        let end = (to as usize).min(chain.len());
        Ok(chain[start..end].to_vec())
    }

    fn chain_len(&self, listing: &ListingId) -> Result<u64, LedgerError> {
        let state = self.read()?;
        Ok(state.get(listing).map(|c| c.len() as u64).unwrap_or(0))
    }

    fn listings(&self) -> Result<Vec<ListingId>, LedgerError> {
        let state = self.read()?;
        let mut ids: Vec<_> = state.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}
