//! Append-only provenance ledger core.
//!
//! This crate is the heart of the provenance ledger. It provides:
//! - The hash-sealed [`Block`] record and its canonical hash form
//! - The block builder ([`builder::next_block`])
//! - The [`ChainStore`] trait boundary and [`InMemoryChainStore`]
//! - [`ChainValidator`]: genesis, sequence, linkage, and tamper checks
//! - The [`Timeline`] projection for history views
//!
//! One chain per listing; blocks are never updated or deleted.

pub mod block;
pub mod builder;
pub mod error;
pub mod memory;
pub mod projection;
pub mod traits;
pub mod validator;

pub use block::{meta, Block};
pub use builder::next_block;
pub use error::{ConflictReason, LedgerError};
pub use memory::InMemoryChainStore;
pub use projection::{Timeline, TimelineSummary};
pub use traits::ChainStore;
pub use validator::{ChainSummary, ChainValidator};
