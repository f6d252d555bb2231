// # eipdns-core
//
// Reconciliation core of the EfficientIP DNS synchronization adapter.
//
// An external orchestrator computes the difference between desired and
// observed DNS records; this crate is the leaf translator between that
// orchestrator's endpoint model and the EfficientIP backend.
//
// ## Architecture Overview
//
// - **DomainFilter**: decides whether a zone name is in scope
// - **DnsBackend**: trait over the vendor's list/add/delete calls
// - **ZoneCatalog**: zones of the configured smart/view, filtered
// - **translator**: backend rows <-> endpoints, A-record coalescing
// - **EfficientIpProvider**: the `Provider` façade (records, apply, adjust)
//
// ## Design Principles
//
// 1. **Stateless**: backend state is re-fetched on every call, never cached
// 2. **Narrow backend seam**: the vendor API sits behind `DnsBackend`, so the
//    core is tested against in-memory doubles
// 3. **Explicit configuration**: an immutable config value is passed to the
//    provider at construction, no globals

pub mod config;
pub mod domain_filter;
pub mod endpoint;
pub mod error;
pub mod provider;
pub mod traits;
pub mod translator;
pub mod zones;

// Re-export core types for convenience
pub use config::{Credentials, DomainFilterConfig, EfficientIpConfig};
pub use domain_filter::DomainFilter;
pub use endpoint::{Changes, Endpoint, PTR_RECORD_EXISTS, ProviderSpecificProperty, RecordType};
pub use error::{Error, Result};
pub use provider::EfficientIpProvider;
pub use traits::{DnsBackend, Provider, RawRecord, RecordChange, Zone};
pub use zones::ZoneCatalog;

pub use tokio_util::sync::CancellationToken;
