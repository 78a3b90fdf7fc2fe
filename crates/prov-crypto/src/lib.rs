//! Content hashing for the provenance ledger.
//!
//! One concern: turning a block's canonical byte form into its
//! [`BlockHash`](prov_types::BlockHash), deterministically, on every
//! platform. No keys, no signing, no state.

pub mod hasher;

pub use hasher::{BlockHasher, HasherError};
