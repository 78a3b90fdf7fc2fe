use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use prov_ledger::{
    next_block, Block, ChainStore, ChainSummary, ChainValidator, LedgerError, Timeline,
    TimelineSummary,
};
use prov_types::{ActorSnapshot, LifecycleAction, ListingId, Metadata};

use crate::error::{ServiceError, ServiceResult};
use crate::request::EventRequest;

/// Append attempts per event. Only a `SequenceConflict` is retried.
const MAX_APPEND_ATTEMPTS: u32 = 3;

/// The provenance façade the marketplace talks to.
///
/// Appends are serialized per listing: a keyed mutex covers the whole
/// fetch-latest / build / append cycle, so under normal operation the
/// store's own conditional append never fires. The retry loop exists for
/// stores shared with out-of-process writers, where the keyed lock cannot
/// reach; it retries transient conflicts only, up to
/// [`MAX_APPEND_ATTEMPTS`].
pub struct ProvenanceService<S: ChainStore> {
    store: S,
    locks: Mutex<HashMap<ListingId, Arc<Mutex<()>>>>,
}

impl<S: ChainStore> ProvenanceService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Borrow the underlying store (read paths, maintenance tooling).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record the genesis event of a new listing's chain.
    ///
    /// The action is always `Created`; fails with
    /// [`LedgerError::ChainAlreadyExists`] if the chain has one.
    pub fn record_genesis(
        &self,
        listing: ListingId,
        actor: ActorSnapshot,
        metadata: Metadata,
    ) -> ServiceResult<Block> {
        self.record_event(listing, LifecycleAction::Created, actor, metadata)
    }

    /// Record a lifecycle event, extending the listing's chain by one
    /// block.
    pub fn record_event(
        &self,
        listing: ListingId,
        action: LifecycleAction,
        actor: ActorSnapshot,
        metadata: Metadata,
    ) -> ServiceResult<Block> {
        let guard = self.chain_lock(&listing)?;
        let _held = guard
            .lock()
            .map_err(|_| LedgerError::Store("chain lock poisoned".into()))?;

        let mut attempt = 1;
        loop {
            let prior = self.store.latest(&listing)?;
            let block = next_block(listing, action, actor.clone(), metadata.clone(), prior.as_ref())?;

            match self.store.append(block.clone()) {
                Ok(()) => {
                    info!(
                        listing = %listing,
                        seq = block.sequence_number,
                        action = %action.as_str(),
                        actor = %block.actor.actor_id,
                        "event recorded"
                    );
                    return Ok(block);
                }
                Err(e) if e.is_transient() && attempt < MAX_APPEND_ATTEMPTS => {
                    warn!(
                        listing = %listing,
                        attempt,
                        "append conflict, re-reading tail"
                    );
                    attempt += 1;
                }
                Err(e) if e.is_transient() => {
                    return Err(ServiceError::Exhausted {
                        listing,
                        attempts: attempt,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Record an event named by its wire string (`"CREATED"`, `"VERIFIED"`,
    /// ...), for callers holding untyped input.
    pub fn record_event_named(
        &self,
        listing: ListingId,
        action: &str,
        actor: ActorSnapshot,
        metadata: Metadata,
    ) -> ServiceResult<Block> {
        let action = LifecycleAction::from_str(action)
            .map_err(|_| LedgerError::InvalidAction(action.to_string()))?;
        self.record_event(listing, action, actor, metadata)
    }

    /// Record a built-up [`EventRequest`].
    pub fn record(&self, listing: ListingId, request: EventRequest) -> ServiceResult<Block> {
        self.record_event(listing, request.action, request.actor, request.metadata)
    }

    /// The full block history of a listing, oldest first. Empty if no
    /// chain exists.
    pub fn history(&self, listing: &ListingId) -> ServiceResult<Vec<Block>> {
        Ok(self.store.blocks(listing)?)
    }

    /// The most recent block of a listing's chain.
    pub fn latest(&self, listing: &ListingId) -> ServiceResult<Option<Block>> {
        Ok(self.store.latest(listing)?)
    }

    /// Walk and verify one listing's chain end to end.
    pub fn verify_chain(&self, listing: &ListingId) -> ServiceResult<ChainSummary> {
        debug!(listing = %listing, "verifying chain");
        Ok(ChainValidator::validate(&self.store, listing)?)
    }

    /// Verify every chain in the store.
    pub fn verify_all(&self) -> ServiceResult<Vec<ChainSummary>> {
        Ok(ChainValidator::validate_all(&self.store)?)
    }

    /// Headline timeline facts for a listing (no integrity verdict).
    pub fn timeline(&self, listing: &ListingId) -> ServiceResult<TimelineSummary> {
        Ok(Timeline::summarize(&self.store, listing)?)
    }

    /// One lock per listing, created on first use. Lock handles are
    /// retained for the life of the service; the per-listing footprint is
    /// a single `Arc<Mutex<()>>`.
    fn chain_lock(&self, listing: &ListingId) -> Result<Arc<Mutex<()>>, LedgerError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LedgerError::Store("lock table poisoned".into()))?;
        Ok(locks.entry(*listing).or_default().clone())
    }
}

#[cfg(test)]
mod tests {
    use prov_ledger::InMemoryChainStore;
    use prov_types::ActorRole;

    use super::*;

    fn service() -> ProvenanceService<InMemoryChainStore> {
        ProvenanceService::new(InMemoryChainStore::new())
    }

    fn generator() -> ActorSnapshot {
        ActorSnapshot::new("u-1", "Asha Patel", ActorRole::Generator)
    }

    #[test]
    fn genesis_then_event() {
        let svc = service();
        let listing = ListingId::ephemeral();

        let g = svc
            .record_genesis(listing, generator(), Metadata::new())
            .unwrap();
        assert!(g.is_genesis());

        let b = svc
            .record_event(
                listing,
                LifecycleAction::Listed,
                generator(),
                Metadata::new(),
            )
            .unwrap();
        assert_eq!(b.sequence_number, 1);
        assert_eq!(b.previous_hash, g.block_hash);
    }

    #[test]
    fn event_before_genesis_is_rejected() {
        let svc = service();
        let listing = ListingId::ephemeral();
        let err = svc
            .record_event(
                listing,
                LifecycleAction::Verified,
                generator(),
                Metadata::new(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Ledger(LedgerError::ChainNotInitialized { listing })
        );
    }

    #[test]
    fn duplicate_genesis_is_rejected() {
        let svc = service();
        let listing = ListingId::ephemeral();
        svc.record_genesis(listing, generator(), Metadata::new())
            .unwrap();
        let err = svc
            .record_genesis(listing, generator(), Metadata::new())
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Ledger(LedgerError::ChainAlreadyExists { listing })
        );
    }

    #[test]
    fn named_action_parses_wire_strings() {
        let svc = service();
        let listing = ListingId::ephemeral();
        svc.record_event_named(listing, "CREATED", generator(), Metadata::new())
            .unwrap();
        let b = svc
            .record_event_named(listing, "LISTED", generator(), Metadata::new())
            .unwrap();
        assert_eq!(b.action, LifecycleAction::Listed);
    }

    #[test]
    fn unknown_named_action_is_invalid() {
        let svc = service();
        let listing = ListingId::ephemeral();
        let err = svc
            .record_event_named(listing, "EXPLODED", generator(), Metadata::new())
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Ledger(LedgerError::InvalidAction("EXPLODED".into()))
        );
    }

    #[test]
    fn history_is_in_chain_order() {
        let svc = service();
        let listing = ListingId::ephemeral();
        svc.record_genesis(listing, generator(), Metadata::new())
            .unwrap();
        for action in [LifecycleAction::Listed, LifecycleAction::Verified] {
            svc.record_event(listing, action, generator(), Metadata::new())
                .unwrap();
        }

        let history = svc.history(&listing).unwrap();
        assert_eq!(history.len(), 3);
        for (i, block) in history.iter().enumerate() {
            assert_eq!(block.sequence_number, i as u64);
        }
    }
}
