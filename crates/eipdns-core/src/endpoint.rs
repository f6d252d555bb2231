//! Generic DNS record model shared with the orchestrator
//!
//! - [`Endpoint`]: one DNS record set (name, type, targets, TTL, metadata)
//! - [`Changes`]: the four-way partition of one reconciliation cycle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-specific key marking that a PTR record accompanies an A record
pub const PTR_RECORD_EXISTS: &str = "efficientip-ptr-record-exists";

/// DNS record type
///
/// Names are the exact upper-case wire names. Anything else is carried
/// through unchanged as [`RecordType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// IPv4 address
    A,
    /// IPv6 address
    Aaaa,
    /// Canonical name
    Cname,
    /// Text
    Txt,
    /// Mail exchanger
    Mx,
    /// Name server
    Ns,
    /// Reverse pointer
    Ptr,
    /// Service locator
    Srv,
    /// Any type without a dedicated variant (e.g. NAPTR)
    Other(String),
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Srv => "SRV",
            RecordType::Other(name) => name,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        match s {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "TXT" => RecordType::Txt,
            "MX" => RecordType::Mx,
            "NS" => RecordType::Ns,
            "PTR" => RecordType::Ptr,
            "SRV" => RecordType::Srv,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        RecordType::from(s.as_str())
    }
}

impl From<RecordType> for String {
    fn from(record_type: RecordType) -> Self {
        match record_type {
            RecordType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A provider-specific property attached to an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpecificProperty {
    pub name: String,
    pub value: String,
}

/// One DNS record set as the orchestrator understands it
///
/// For type A, `targets` may carry several addresses that the backend
/// stores as separate rows under the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub dns_name: String,

    pub record_type: RecordType,

    #[serde(default)]
    pub targets: Vec<String>,

    /// Unset means "use the backend default"
    #[serde(default, rename = "recordTTL", skip_serializing_if = "Option::is_none")]
    pub record_ttl: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider_specific: Vec<ProviderSpecificProperty>,
}

impl Endpoint {
    /// Create an endpoint without a TTL
    pub fn new(
        dns_name: impl Into<String>,
        record_type: RecordType,
        targets: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            record_type,
            targets: targets.into_iter().map(Into::into).collect(),
            record_ttl: None,
            provider_specific: Vec::new(),
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.record_ttl = Some(ttl);
        self
    }

    /// Append a provider-specific property
    pub fn with_provider_specific(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.provider_specific.push(ProviderSpecificProperty {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Look up a provider-specific property
    pub fn provider_specific(&self, name: &str) -> Option<&str> {
        self.provider_specific
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Overwrite every property named `name`, or append one if none exists
    pub fn set_provider_specific(&mut self, name: &str, value: &str) {
        let mut found = false;
        for property in self.provider_specific.iter_mut().filter(|p| p.name == name) {
            property.value = value.to_string();
            found = true;
        }
        if !found {
            self.provider_specific.push(ProviderSpecificProperty {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }
}

/// Changes computed by the orchestrator for one reconciliation cycle
///
/// `update_old[i]` and `update_new[i]` describe the same record before and
/// after the update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Changes {
    #[serde(default)]
    pub create: Vec<Endpoint>,
    #[serde(default)]
    pub update_old: Vec<Endpoint>,
    #[serde(default)]
    pub update_new: Vec<Endpoint>,
    #[serde(default)]
    pub delete: Vec<Endpoint>,
}

impl Changes {
    /// True when the changeset contains nothing to apply
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty()
    }
}
