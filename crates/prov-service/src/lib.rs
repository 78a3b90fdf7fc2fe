//! High-level provenance API.
//!
//! [`ProvenanceService`] is the one entry point marketplace code talks to:
//! it serializes appends per listing, retries benign append races, and
//! exposes history, verification, and timeline reads. Everything below it
//! (blocks, stores, the validator) lives in `prov-ledger`.

pub mod error;
pub mod request;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use request::EventRequest;
pub use service::ProvenanceService;
