use prov_types::{ActorSnapshot, BlockHash, EventTime, LifecycleAction, ListingId, Metadata};

use crate::block::Block;
use crate::error::LedgerError;

/// Build the next block of a chain.
///
/// Pure transformation plus a timestamp read: no I/O, no mutation of
/// `prior`. The result is fully formed and hash-sealed.
///
/// # Errors
///
/// - [`LedgerError::InvalidActor`] if the actor snapshot has no usable id.
/// - [`LedgerError::ChainNotInitialized`] if `prior` is absent and `action`
///   is not `Created` (the chain must start with its genesis event).
/// - [`LedgerError::ChainAlreadyExists`] if `prior` is present and `action`
///   is `Created` (a chain has exactly one genesis).
pub fn next_block(
    listing_id: ListingId,
    action: LifecycleAction,
    actor: ActorSnapshot,
    metadata: Metadata,
    prior: Option<&Block>,
) -> Result<Block, LedgerError> {
    if !actor.has_valid_id() {
        return Err(LedgerError::InvalidActor {
            reason: "empty actor_id".into(),
        });
    }

    let (sequence_number, previous_hash) = match prior {
        None if action.is_genesis() => (0, BlockHash::SENTINEL),
        None => return Err(LedgerError::ChainNotInitialized { listing: listing_id }),
        Some(_) if action.is_genesis() => {
            return Err(LedgerError::ChainAlreadyExists { listing: listing_id })
        }
        Some(p) => (p.sequence_number + 1, p.block_hash),
    };

    let timestamp = EventTime::next_after(prior.map(|p| &p.timestamp));

    Block {
        listing_id,
        sequence_number,
        previous_hash,
        action,
        actor,
        timestamp,
        metadata,
        block_hash: BlockHash::SENTINEL,
    }
    .seal()
}
