//! Foundation types for the provenance ledger.
//!
//! This crate provides the identity, actor, action, and temporal types used
//! throughout the ledger. Every other `prov-` crate depends on `prov-types`.
//!
//! # Key Types
//!
//! - [`ListingId`] — Identity of one listing's chain, derived via BLAKE3
//! - [`BlockHash`] — 256-bit content hash of a block, with a genesis sentinel
//! - [`LifecycleAction`] — Closed set of recordable lifecycle events
//! - [`ActorSnapshot`] — Immutable who-did-it snapshot captured at event time
//! - [`EventTime`] — Wall-clock timestamp with a logical tick for ordering
//! - [`MetaValue`] — Scalar/string values for the open metadata mapping

pub mod action;
pub mod actor;
pub mod error;
pub mod hash;
pub mod id;
pub mod metadata;
pub mod time;

pub use action::LifecycleAction;
pub use actor::{ActorRole, ActorSnapshot};
pub use error::TypeError;
pub use hash::BlockHash;
pub use id::ListingId;
pub use metadata::{MetaValue, Metadata};
pub use time::EventTime;
