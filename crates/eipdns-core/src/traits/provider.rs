//! Provider façade consumed by the orchestrator

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain_filter::DomainFilter;
use crate::endpoint::{Changes, Endpoint};

/// The orchestrator-facing contract
///
/// Each call runs to completion before returning. `cancel` aborts the
/// in-flight backend call and returns [`crate::Error::Cancelled`].
#[async_trait]
pub trait Provider: Send + Sync {
    /// Filter scoping the zones this provider manages
    fn domain_filter(&self) -> &DomainFilter;

    /// Current records across all in-scope zones
    async fn records(&self, cancel: &CancellationToken) -> crate::Result<Vec<Endpoint>>;

    /// Apply one reconciliation cycle's changes
    async fn apply_changes(&self, cancel: &CancellationToken, changes: Changes) -> crate::Result<()>;

    /// Normalize desired endpoints before the orchestrator diffs them
    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        endpoints
    }
}
