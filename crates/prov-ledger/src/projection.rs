use prov_types::{BlockHash, EventTime, LifecycleAction, ListingId};

use crate::error::LedgerError;
use crate::traits::ChainStore;

/// Headline facts about one listing's chain, for timeline views.
///
/// Built from stored blocks only; carries no validity verdict. Callers who
/// need integrity run the validator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelineSummary {
    pub listing_id: ListingId,
    pub total_blocks: u64,
    pub genesis_time: Option<EventTime>,
    pub genesis_hash: Option<BlockHash>,
    pub latest_action: Option<LifecycleAction>,
    pub latest_time: Option<EventTime>,
    pub head_hash: Option<BlockHash>,
}

/// Deterministic projections over a stored chain.
pub struct Timeline;

impl Timeline {
    pub fn summarize<S: ChainStore>(
        store: &S,
        listing: &ListingId,
    ) -> Result<TimelineSummary, LedgerError> {
        let length = store.chain_len(listing)?;
        let genesis = store.read_range(listing, 0, 1)?.into_iter().next();
        let head = store.latest(listing)?;

        Ok(TimelineSummary {
            listing_id: *listing,
            total_blocks: length,
            genesis_time: genesis.as_ref().map(|b| b.timestamp),
            genesis_hash: genesis.as_ref().map(|b| b.block_hash),
            latest_action: head.as_ref().map(|b| b.action),
            latest_time: head.as_ref().map(|b| b.timestamp),
            head_hash: head.as_ref().map(|b| b.block_hash),
        })
    }
}
