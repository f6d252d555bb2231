//! Zone catalog: the in-scope zones of the configured smart/view

use tracing::debug;

use crate::domain_filter::DomainFilter;
use crate::error::Result;
use crate::traits::{DnsBackend, Zone};

/// Lists zones for one smart (and optional view) and applies the domain filter
///
/// Zones are fetched fresh on every call.
#[derive(Debug, Clone)]
pub struct ZoneCatalog {
    smart: String,
    view: Option<String>,
    filter: DomainFilter,
}

impl ZoneCatalog {
    pub fn new(smart: impl Into<String>, view: Option<String>, filter: DomainFilter) -> Self {
        Self {
            smart: smart.into(),
            view: view.filter(|v| !v.is_empty()),
            filter,
        }
    }

    pub fn filter(&self) -> &DomainFilter {
        &self.filter
    }

    /// Fetch zones from `backend` and keep the ones the filter accepts
    ///
    /// Backend errors are returned unchanged. No zones, or all zones
    /// filtered out, is an empty list.
    pub async fn zones<B: DnsBackend + ?Sized>(&self, backend: &B) -> Result<Vec<Zone>> {
        let zones = backend.list_zones(&self.smart, self.view.as_deref()).await?;

        Ok(zones
            .into_iter()
            .filter(|zone| {
                let keep = self.filter.matches(&zone.name);
                if !keep {
                    debug!("Ignore zone [{}] by domain filter", zone.name);
                }
                keep
            })
            .collect())
    }
}
