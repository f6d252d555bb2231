//! Test doubles and common utilities for provider contract tests

#![allow(dead_code)]

use eipdns_core::error::{Error, Result};
use eipdns_core::traits::{DnsBackend, RawRecord, RecordChange, Zone};
use eipdns_core::{Credentials, DomainFilter, EfficientIpConfig, EfficientIpProvider};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// One backend call as observed by [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListZones { smart: String, view: Option<String> },
    ListRecords { zone_id: String },
    Add(RecordChange),
    Delete(RecordChange),
}

/// An in-memory backend that records every call
#[derive(Default)]
pub struct RecordingBackend {
    zones: Vec<Zone>,
    records: HashMap<String, Vec<RawRecord>>,
    calls: Mutex<Vec<Call>>,
    fail_zones: bool,
    fail_records_for: HashSet<String>,
    fail_values: HashSet<String>,
    delay: Option<Duration>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone with its rows
    pub fn with_zone(mut self, name: &str, id: &str, rows: Vec<RawRecord>) -> Self {
        self.zones.push(Zone::new(name, "master", id));
        self.records.insert(id.to_string(), rows);
        self
    }

    /// Make zone listing fail
    pub fn failing_zones(mut self) -> Self {
        self.fail_zones = true;
        self
    }

    /// Make record listing fail for one zone
    pub fn failing_records_for(mut self, zone_id: &str) -> Self {
        self.fail_records_for.insert(zone_id.to_string());
        self
    }

    /// Make add/delete fail for one target value
    pub fn failing_value(mut self, value: &str) -> Self {
        self.fail_values.insert(value.to_string());
        self
    }

    /// Delay every call (for cancellation tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call seen so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Only add/delete calls
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Add(_) | Call::Delete(_)))
            .collect()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait::async_trait]
impl DnsBackend for RecordingBackend {
    async fn list_zones(&self, smart: &str, view: Option<&str>) -> Result<Vec<Zone>> {
        self.record(Call::ListZones {
            smart: smart.to_string(),
            view: view.map(str::to_string),
        })
        .await;
        if self.fail_zones {
            return Err(Error::backend("dns_zone_list", "success: false"));
        }
        Ok(self.zones.clone())
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<RawRecord>> {
        self.record(Call::ListRecords {
            zone_id: zone.id.clone(),
        })
        .await;
        if self.fail_records_for.contains(&zone.id) {
            return Err(Error::backend("dns_rr_list", "HTTP 500"));
        }
        Ok(self.records.get(&zone.id).cloned().unwrap_or_default())
    }

    async fn add_record(&self, change: &RecordChange) -> Result<()> {
        self.record(Call::Add(change.clone())).await;
        if self.fail_values.contains(&change.value) {
            return Err(Error::backend("dns_rr_add", "duplicate record"));
        }
        Ok(())
    }

    async fn delete_record(&self, change: &RecordChange) -> Result<()> {
        self.record(Call::Delete(change.clone())).await;
        if self.fail_values.contains(&change.value) {
            return Err(Error::backend("dns_rr_delete", "no such record"));
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

/// Minimal valid configuration for tests
pub fn test_config() -> EfficientIpConfig {
    EfficientIpConfig::new(
        "smart1",
        Credentials::Basic {
            username: "ipmadmin".to_string(),
            password: "secret".to_string(),
        },
    )
}

/// Build a provider around `backend` with a match-all filter
pub fn provider_with(
    backend: RecordingBackend,
    config: EfficientIpConfig,
) -> EfficientIpProvider<RecordingBackend> {
    EfficientIpProvider::new(config, DomainFilter::default(), backend)
        .expect("provider construction succeeds")
}
