use prov_types::{BlockHash, ListingId};
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::traits::ChainStore;

/// Successful validation: the whole chain was walked and every invariant
/// held.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainSummary {
    pub listing_id: ListingId,
    /// Number of blocks walked (including genesis).
    pub length: u64,
    /// Hash of the last block, `None` for an empty chain.
    pub head_hash: Option<BlockHash>,
}

/// Chain integrity validator.
///
/// Walks a stored chain in order and verifies hash linkage, sequence
/// contiguity, and content integrity. Short-circuits on the first failure,
/// reporting the offending sequence number; it never skips or repairs a
/// broken link, and it never writes.
pub struct ChainValidator;

/// Blocks fetched per `read_range` page while walking a chain.
const PAGE: u64 = 256;

impl ChainValidator {
    /// Validate one listing's chain. An absent chain validates trivially
    /// with length 0.
    pub fn validate<S: ChainStore>(
        store: &S,
        listing: &ListingId,
    ) -> Result<ChainSummary, LedgerError> {
        let mut position: u64 = 0;
        let mut prev_hash = BlockHash::SENTINEL;

        loop {
            let page = store.read_range(listing, position, position + PAGE)?;
            if page.is_empty() {
                break;
            }

            for block in &page {
                if position == 0 {
                    if block.sequence_number != 0 || !block.previous_hash.is_sentinel() {
                        warn!(listing = %listing, seq = block.sequence_number, "broken genesis");
                        return Err(LedgerError::BrokenGenesis {
                            at: block.sequence_number,
                        });
                    }
                } else {
                    if block.sequence_number != position {
                        warn!(
                            listing = %listing,
                            seq = block.sequence_number,
                            expected = position,
                            "sequence gap"
                        );
                        return Err(LedgerError::SequenceGap {
                            at: block.sequence_number,
                            expected: position,
                        });
                    }
                    if block.previous_hash != prev_hash {
                        warn!(listing = %listing, seq = block.sequence_number, "broken link");
                        return Err(LedgerError::BrokenLink {
                            at: block.sequence_number,
                        });
                    }
                }

                if block.canonical_hash()? != block.block_hash {
                    warn!(listing = %listing, seq = block.sequence_number, "tampered block");
                    return Err(LedgerError::TamperedBlock {
                        at: block.sequence_number,
                    });
                }

                prev_hash = block.block_hash;
                position += 1;
            }
        }

        debug!(listing = %listing, length = position, "chain valid");
        Ok(ChainSummary {
            listing_id: *listing,
            length: position,
            head_hash: (position > 0).then_some(prev_hash),
        })
    }

    /// Validate every chain in the store, short-circuiting on the first
    /// broken one.
    pub fn validate_all<S: ChainStore>(store: &S) -> Result<Vec<ChainSummary>, LedgerError> {
        let mut summaries = Vec::new();
        for listing in store.listings()? {
            summaries.push(Self::validate(store, &listing)?);
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use prov_types::{ActorRole, ActorSnapshot, LifecycleAction, MetaValue, Metadata};

    use crate::block::{meta, Block};
    use crate::builder::next_block;
    use crate::memory::InMemoryChainStore;

    use super::*;

    fn build_chain(store: &InMemoryChainStore, listing: ListingId, events: usize) -> Vec<Block> {
        let mut blocks = Vec::new();
        let genesis = next_block(
            listing,
            LifecycleAction::Created,
            ActorSnapshot::new("u-1", "Asha Patel", ActorRole::Generator),
            Metadata::new(),
            None,
        )
        .unwrap();
        store.append(genesis.clone()).unwrap();
        blocks.push(genesis);

        for i in 0..events {
            let mut metadata = Metadata::new();
            metadata.insert(meta::TRUST_SCORE.into(), MetaValue::Int(i as i64));
            let next = next_block(
                listing,
                LifecycleAction::Updated,
                ActorSnapshot::system(),
                metadata,
                Some(blocks.last().unwrap()),
            )
            .unwrap();
            store.append(next.clone()).unwrap();
            blocks.push(next);
        }
        blocks
    }

    #[test]
    fn valid_chain_passes() {
        let store = InMemoryChainStore::new();
        let listing = ListingId::ephemeral();
        let blocks = build_chain(&store, listing, 5);

        let summary = ChainValidator::validate(&store, &listing).unwrap();
        assert_eq!(summary.length, 6);
        assert_eq!(summary.head_hash, Some(blocks.last().unwrap().block_hash));
    }

    #[test]
    fn empty_chain_is_trivially_valid() {
        let store = InMemoryChainStore::new();
        let listing = ListingId::ephemeral();
        let summary = ChainValidator::validate(&store, &listing).unwrap();
        assert_eq!(summary.length, 0);
        assert_eq!(summary.head_hash, None);
    }

    #[test]
    fn long_chain_spans_pages() {
        let store = InMemoryChainStore::new();
        let listing = ListingId::ephemeral();
        build_chain(&store, listing, 300);

        let summary = ChainValidator::validate(&store, &listing).unwrap();
        assert_eq!(summary.length, 301);
    }

    #[test]
    fn tampered_metadata_detected_at_exact_seq() {
        let store = InMemoryChainStore::new();
        let listing = ListingId::ephemeral();
        build_chain(&store, listing, 5);

        store.corrupt_block_for_test(&listing, 3, |b| {
            b.metadata
                .insert(meta::TRUST_SCORE.into(), MetaValue::Int(999));
        });

        let err = ChainValidator::validate(&store, &listing).unwrap_err();
        assert_eq!(err, LedgerError::TamperedBlock { at: 3 });
    }

    #[test]
    fn tampered_actor_detected() {
        let store = InMemoryChainStore::new();
        let listing = ListingId::ephemeral();
        build_chain(&store, listing, 2);

        store.corrupt_block_for_test(&listing, 1, |b| {
            b.actor.display_name = "Mallory".into();
        });

        let err = ChainValidator::validate(&store, &listing).unwrap_err();
        assert_eq!(err, LedgerError::TamperedBlock { at: 1 });
    }

    #[test]
    fn tampered_genesis_detected() {
        let store = InMemoryChainStore::new();
        let listing = ListingId::ephemeral();
        build_chain(&store, listing, 2);

        store.corrupt_block_for_test(&listing, 0, |b| {
            b.metadata.insert("weight".into(), MetaValue::Int(5000));
        });

        let err = ChainValidator::validate(&store, &listing).unwrap_err();
        assert_eq!(err, LedgerError::TamperedBlock { at: 0 });
    }

    #[test]
    fn rewritten_link_detected() {
        let store = InMemoryChainStore::new();
        let listing = ListingId::ephemeral();
        build_chain(&store, listing, 3);

        store.corrupt_block_for_test(&listing, 2, |b| {
            b.previous_hash = BlockHash::from_bytes([9; 32]);
        });

        let err = ChainValidator::validate(&store, &listing).unwrap_err();
        assert_eq!(err, LedgerError::BrokenLink { at: 2 });
    }

    #[test]
    fn sequence_gap_detected() {
        let store = InMemoryChainStore::new();
        let listing = ListingId::ephemeral();
        build_chain(&store, listing, 3);

        store.corrupt_block_for_test(&listing, 2, |b| {
            b.sequence_number = 7;
        });

        let err = ChainValidator::validate(&store, &listing).unwrap_err();
        assert_eq!(err, LedgerError::SequenceGap { at: 7, expected: 2 });
    }

    #[test]
    fn broken_genesis_detected() {
        let store = InMemoryChainStore::new();
        let listing = ListingId::ephemeral();
        build_chain(&store, listing, 1);

        store.corrupt_block_for_test(&listing, 0, |b| {
            b.previous_hash = BlockHash::from_bytes([1; 32]);
        });

        let err = ChainValidator::validate(&store, &listing).unwrap_err();
        assert_eq!(err, LedgerError::BrokenGenesis { at: 0 });
    }

    #[test]
    fn validate_all_covers_every_chain() {
        let store = InMemoryChainStore::new();
        let l1 = ListingId::ephemeral();
        let l2 = ListingId::ephemeral();
        build_chain(&store, l1, 2);
        build_chain(&store, l2, 4);

        let summaries = ChainValidator::validate_all(&store).unwrap();
        assert_eq!(summaries.len(), 2);
        let total: u64 = summaries.iter().map(|s| s.length).sum();
        assert_eq!(total, 3 + 5);
    }
}
