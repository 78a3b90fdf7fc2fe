//! Durable storage for provenance chains.
//!
//! [`FileChainStore`] persists blocks in a single append-only log file with
//! length+CRC framing and rebuilds its per-listing indexes by scanning the
//! file on open. It implements the same [`ChainStore`](prov_ledger::ChainStore)
//! boundary as the in-memory store, so the service layer is storage-agnostic.

pub mod error;
pub mod file;

pub use error::StoreError;
pub use file::{FileChainStore, SyncMode};
