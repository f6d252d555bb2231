// # DNS Backend Trait
//
// The narrow interface over the vendor's record and zone APIs.
//
// ## Implementations
//
// - SOLIDserver REST: `eipdns-solidserver` crate
// - Test doubles: `tests/common/mod.rs`
//
// ## Usage
//
// ```rust,ignore
// use eipdns_core::DnsBackend;
//
// let zones = backend.list_zones("smart1", None).await?;
// for zone in &zones {
//     let rows = backend.list_records(zone).await?;
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::endpoint::RecordType;

/// A DNS zone as known to the backend
///
/// Identity is `id`; `name` is used for domain filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub zone_type: String,
    pub id: String,
}

impl Zone {
    pub fn new(name: impl Into<String>, zone_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone_type: zone_type.into(),
            id: id.into(),
        }
    }
}

/// One resource-record row as returned by the backend
///
/// Fields are kept as the backend reports them; `ttl` in particular may be
/// empty or non-numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: String,
    pub record_type: String,
    pub ttl: String,
    pub value: String,
}

impl RawRecord {
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            ttl: ttl.into(),
            value: value.into(),
        }
    }
}

/// A single-value mutation: one backend row to add or delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordChange {
    pub name: String,
    pub record_type: RecordType,
    /// Ignored on delete; unset lets the backend apply its default
    pub ttl: Option<u32>,
    pub value: String,
}

/// Vendor DNS backend
///
/// Implementations issue exactly one backend call per method invocation and
/// return errors as-is. They MUST NOT retry, cache, or spawn tasks; the
/// provider owns the error policy (listing errors propagate, per-target
/// mutation errors are logged and swallowed).
///
/// A transport failure, an HTTP error status, and an envelope reporting
/// failure are all the same condition: `Err(Error::Backend { .. })`.
#[async_trait]
pub trait DnsBackend: Send + Sync {
    /// List the zones served by `smart`, narrowed to `view` when given
    async fn list_zones(&self, smart: &str, view: Option<&str>) -> crate::Result<Vec<Zone>>;

    /// List the rows of one zone, ordered by full record name
    async fn list_records(&self, zone: &Zone) -> crate::Result<Vec<RawRecord>>;

    /// Add one row
    async fn add_record(&self, change: &RecordChange) -> crate::Result<()>;

    /// Delete one row identified by name, type and value
    async fn delete_record(&self, change: &RecordChange) -> crate::Result<()>;

    /// Backend name (for logging)
    fn backend_name(&self) -> &'static str;
}

#[async_trait]
impl<B: DnsBackend + ?Sized> DnsBackend for std::sync::Arc<B> {
    async fn list_zones(&self, smart: &str, view: Option<&str>) -> crate::Result<Vec<Zone>> {
        (**self).list_zones(smart, view).await
    }

    async fn list_records(&self, zone: &Zone) -> crate::Result<Vec<RawRecord>> {
        (**self).list_records(zone).await
    }

    async fn add_record(&self, change: &RecordChange) -> crate::Result<()> {
        (**self).add_record(change).await
    }

    async fn delete_record(&self, change: &RecordChange) -> crate::Result<()> {
        (**self).delete_record(change).await
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
