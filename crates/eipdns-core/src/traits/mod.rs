//! Core traits for the adapter
//!
//! - [`DnsBackend`]: list/add/delete against the vendor backend
//! - [`Provider`]: the façade the orchestrator drives

pub mod backend;
pub mod provider;

pub use backend::{DnsBackend, RawRecord, RecordChange, Zone};
pub use provider::Provider;
