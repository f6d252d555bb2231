//! EfficientIP provider: the reconciler the orchestrator drives
//!
//! ## Flow
//!
//! ```text
//! records()        ZoneCatalog ──► DnsBackend::list_records (per zone) ──► translator
//! apply_changes()  Delete, UpdateOld ──► delete per target
//!                  UpdateNew, Create ──► add per target
//! ```
//!
//! ## Error policy
//!
//! - Listing failures (zones or any zone's records) fail the whole call.
//! - A failed add/delete of one target is logged and skipped; siblings still
//!   run and the call still succeeds. The next reconciliation cycle
//!   re-derives the state and retries.

use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::EfficientIpConfig;
use crate::domain_filter::DomainFilter;
use crate::endpoint::{Changes, Endpoint, PTR_RECORD_EXISTS, RecordType};
use crate::error::{Error, Result};
use crate::traits::{DnsBackend, Provider};
use crate::translator;
use crate::zones::ZoneCatalog;

/// Which half of a change an endpoint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Create,
    Delete,
}

/// Provider backed by a [`DnsBackend`]
///
/// Holds no backend state between calls; every `records()` re-fetches zones
/// and rows.
pub struct EfficientIpProvider<B> {
    backend: B,
    catalog: ZoneCatalog,
    config: EfficientIpConfig,
}

impl<B: DnsBackend> EfficientIpProvider<B> {
    /// Create a provider
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `config` fails validation.
    pub fn new(config: EfficientIpConfig, filter: DomainFilter, backend: B) -> Result<Self> {
        config.validate()?;

        info!("Creating EfficientIP provider with {}", filter.describe());
        if config.dry_run {
            warn!("EfficientIP provider running in DRY-RUN mode - no changes will be made");
        }

        let catalog = ZoneCatalog::new(config.smart.clone(), config.view.clone(), filter);
        Ok(Self {
            backend,
            catalog,
            config,
        })
    }

    /// Underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply one endpoint, one backend call per target
    ///
    /// Returns the number of targets whose backend call failed. Only
    /// cancellation is an error.
    async fn apply_endpoint(
        &self,
        cancel: &CancellationToken,
        mutation: Mutation,
        endpoint: &Endpoint,
    ) -> Result<usize> {
        if self.config.dry_run {
            for value in &endpoint.targets {
                info!(
                    "Would {} {} record named '{}' to '{}' for EfficientIP",
                    if mutation == Mutation::Create { "create" } else { "delete" },
                    endpoint.record_type,
                    endpoint.dns_name,
                    value
                );
            }
            return Ok(0);
        }

        let mut failed = 0;
        for change in translator::changes_for(endpoint) {
            let result = match mutation {
                Mutation::Create => {
                    info!(
                        "Creating {} record named '{}' to '{}' for EfficientIP",
                        change.record_type, change.name, change.value
                    );
                    cancellable(cancel, self.backend.add_record(&change)).await
                }
                Mutation::Delete => {
                    info!(
                        "Deleting {} record named '{}' to '{}' for EfficientIP",
                        change.record_type, change.name, change.value
                    );
                    cancellable(cancel, self.backend.delete_record(&change)).await
                }
            };

            match result {
                Ok(()) => {}
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    failed += 1;
                    error!(
                        "{} of the RR {} {} [{:?}] -> {} failed: {}",
                        if mutation == Mutation::Create { "Creation" } else { "Deletion" },
                        change.record_type,
                        change.name,
                        change.ttl,
                        change.value,
                        e
                    );
                }
            }
        }
        Ok(failed)
    }
}

#[async_trait]
impl<B: DnsBackend> Provider for EfficientIpProvider<B> {
    fn domain_filter(&self) -> &DomainFilter {
        self.catalog.filter()
    }

    async fn records(&self, cancel: &CancellationToken) -> Result<Vec<Endpoint>> {
        debug!("fetching records...");
        let zones = cancellable(cancel, self.catalog.zones(&self.backend)).await?;

        let mut endpoints = Vec::new();
        for zone in &zones {
            debug!("fetch records from zone '{}'", zone.name);
            let rows = cancellable(cancel, self.backend.list_records(zone))
                .await
                .inspect_err(|e| error!("Failed to get RRs from zone [{}]: {}", zone.name, e))?;
            endpoints.extend(translator::to_endpoints(&rows));
        }

        debug!(
            "fetched {} records from {} zone(s) on {}",
            endpoints.len(),
            zones.len(),
            self.backend.backend_name()
        );
        Ok(endpoints)
    }

    async fn apply_changes(&self, cancel: &CancellationToken, changes: Changes) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let Changes {
            create,
            update_old,
            update_new,
            delete,
        } = changes;

        // Deletes and the old half of updates go first so an update never
        // leaves a transient duplicate
        let mut failed = 0;
        for endpoint in delete.iter().chain(update_old.iter()) {
            failed += self.apply_endpoint(cancel, Mutation::Delete, endpoint).await?;
        }
        for endpoint in update_new.iter().chain(create.iter()) {
            failed += self.apply_endpoint(cancel, Mutation::Create, endpoint).await?;
        }

        if failed > 0 {
            warn!("{} record mutation(s) failed and will be retried next cycle", failed);
        }
        Ok(())
    }

    fn adjust_endpoints(&self, mut endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        // A zero TTL is "not configured" in the orchestrator model
        for endpoint in endpoints.iter_mut() {
            if endpoint.record_ttl.is_none_or(|ttl| ttl == 0) {
                endpoint.record_ttl = Some(self.config.default_ttl);
            }
        }

        if !self.config.create_ptr {
            return endpoints;
        }

        for endpoint in endpoints
            .iter_mut()
            .filter(|e| e.record_type == RecordType::A)
        {
            endpoint.set_provider_specific(PTR_RECORD_EXISTS, "true");
        }
        endpoints
    }
}

/// Race `fut` against the cancellation token
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
