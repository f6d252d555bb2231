// # SOLIDserver DNS Backend
//
// This crate implements `eipdns_core::DnsBackend` over the EfficientIP
// SOLIDserver REST API (v2.0).
//
// ## Behavior
//
// - One HTTP request per trait call; no retry, no backoff, no caching
// - Request timeout always set (`EIP_HTTP_TIMEOUT_SECS`, default 30s)
// - TLS certificate validation can be turned off (`ssl_verify = false`)
// - Transport error, HTTP error status and `"success": false` in the
//   response envelope are all reported as `Error::Backend`
//
// ## Security Requirements
//
// - Passwords and token secrets NEVER appear in logs or `Debug` output
//
// ## API Reference
//
// - List zones:   GET    `/api/v2.0/dns/zone/list?where=...&limit=...`
// - List records: GET    `/api/v2.0/dns/rr/list?where=...&orderby=rr_full_name&limit=...`
// - Add record:   POST   `/api/v2.0/dns/rr/add`
// - Delete:       DELETE `/api/v2.0/dns/rr/delete?rr_name=...&rr_type=...&rr_value1=...`

use async_trait::async_trait;
use eipdns_core::config::{Credentials, EfficientIpConfig};
use eipdns_core::traits::{DnsBackend, RawRecord, RecordChange, Zone};
use eipdns_core::{DomainFilter, EfficientIpProvider, Error, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// REST API prefix
const API_PREFIX: &str = "/api/v2.0";

const OP_ZONE_LIST: &str = "dns_zone_list";
const OP_RR_LIST: &str = "dns_rr_list";
const OP_RR_ADD: &str = "dns_rr_add";
const OP_RR_DELETE: &str = "dns_rr_delete";

/// SOLIDserver REST client
pub struct SolidServerClient {
    /// `https://{host}:{port}/api/v2.0`
    base_url: String,

    /// ⚠️ NEVER log the secret half
    credentials: Credentials,

    /// Smart the mutations target
    smart: String,

    /// Optional view the mutations target
    view: Option<String>,

    /// Page size cap for listings
    max_results: u32,

    /// Backend-side record name filter, forwarded as-is
    name_filter: Option<String>,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for SolidServerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolidServerClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("smart", &self.smart)
            .field("view", &self.view)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl SolidServerClient {
    /// Create a client from the adapter configuration
    ///
    /// # Errors
    ///
    /// `Error::Config` if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &EfficientIpConfig) -> Result<Self> {
        config.validate()?;

        if !config.ssl_verify {
            tracing::warn!(
                "TLS certificate verification disabled for SOLIDserver at {}",
                config.host
            );
        }

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: format!("https://{}:{}{}", config.host, config.port, API_PREFIX),
            credentials: config.credentials.clone(),
            smart: config.smart.clone(),
            view: config.view().map(str::to_string),
            max_results: config.max_results,
            name_filter: Some(config.name_regex.clone()).filter(|r| !r.is_empty()),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Credentials::Basic { username, password } => request.basic_auth(username, Some(password)),
            Credentials::Token { token, secret } => {
                request.header(AUTHORIZATION, format!("SDS {}:{}", token, secret))
            }
        }
    }

    /// Send one authorized request and unwrap the response envelope
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<T>> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::backend(operation, format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::backend(operation, format!("Failed to read response: {}", e)))?;

        interpret(operation, status, &body)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.request(method, self.url(path)))
            .header(ACCEPT, "application/json")
    }

    fn zone_list_request(&self, smart: &str, view: Option<&str>) -> reqwest::RequestBuilder {
        let filter = zone_filter(smart, view);
        tracing::debug!("Listing zones where {}", filter);

        self.request(reqwest::Method::GET, "/dns/zone/list").query(&[
            ("where", filter),
            ("limit", self.max_results.to_string()),
        ])
    }

    fn record_list_request(&self, zone: &Zone) -> reqwest::RequestBuilder {
        let filter = record_filter(&zone.id, self.name_filter.as_deref());
        tracing::debug!("Listing records of zone [{}] where {}", zone.name, filter);

        self.request(reqwest::Method::GET, "/dns/rr/list").query(&[
            ("where", filter),
            ("orderby", "rr_full_name".to_string()),
            ("limit", self.max_results.to_string()),
        ])
    }

    fn add_request(&self, change: &RecordChange) -> reqwest::RequestBuilder {
        let body = AddRecordInput {
            rr_name: &change.name,
            rr_type: change.record_type.as_str(),
            rr_value1: &change.value,
            rr_ttl: change.ttl,
            server_name: &self.smart,
            view_name: self.view.as_deref(),
        };

        self.request(reqwest::Method::POST, "/dns/rr/add").json(&body)
    }

    fn delete_request(&self, change: &RecordChange) -> reqwest::RequestBuilder {
        let mut params = vec![
            ("rr_name", change.name.clone()),
            ("rr_type", change.record_type.as_str().to_string()),
            ("rr_value1", change.value.clone()),
            ("server_name", self.smart.clone()),
        ];
        if let Some(view) = &self.view {
            params.push(("view_name", view.clone()));
        }

        self.request(reqwest::Method::DELETE, "/dns/rr/delete").query(&params)
    }
}

#[async_trait]
impl DnsBackend for SolidServerClient {
    async fn list_zones(&self, smart: &str, view: Option<&str>) -> Result<Vec<Zone>> {
        let request = self.zone_list_request(smart, view);
        let rows: Vec<ZoneRow> = self.execute(OP_ZONE_LIST, request).await?;

        Ok(rows
            .into_iter()
            .map(|row| Zone::new(row.zone_name, row.zone_type, row.zone_id))
            .collect())
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<RawRecord>> {
        let request = self.record_list_request(zone);
        let rows: Vec<RecordRow> = self.execute(OP_RR_LIST, request).await?;

        Ok(rows
            .into_iter()
            .map(|row| RawRecord::new(row.rr_full_name, row.rr_type, row.rr_ttl, row.rr_all_value))
            .collect())
    }

    async fn add_record(&self, change: &RecordChange) -> Result<()> {
        let request = self.add_request(change);
        let _: Vec<Value> = self.execute(OP_RR_ADD, request).await?;
        Ok(())
    }

    async fn delete_record(&self, change: &RecordChange) -> Result<()> {
        let request = self.delete_request(change);
        let _: Vec<Value> = self.execute(OP_RR_DELETE, request).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "solidserver"
    }
}

/// Build a provider backed by SOLIDserver
pub fn build_provider(
    config: EfficientIpConfig,
    filter: DomainFilter,
) -> Result<EfficientIpProvider<SolidServerClient>> {
    let client = SolidServerClient::new(&config)?;
    EfficientIpProvider::new(config, filter, client)
}

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    errmsg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ZoneRow {
    #[serde(default)]
    zone_name: String,
    #[serde(default)]
    zone_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    zone_id: String,
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    #[serde(default)]
    rr_full_name: String,
    #[serde(default)]
    rr_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    rr_ttl: String,
    #[serde(default)]
    rr_all_value: String,
}

#[derive(Debug, Serialize)]
struct AddRecordInput<'a> {
    rr_name: &'a str,
    rr_type: &'a str,
    rr_value1: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rr_ttl: Option<u32>,
    server_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    view_name: Option<&'a str>,
}

/// Map an HTTP status and body to rows or a backend error
fn interpret<T: DeserializeOwned>(operation: &str, status: u16, body: &str) -> Result<Vec<T>> {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_str::<Envelope<Value>>(body)
            .ok()
            .and_then(|e| e.errmsg)
            .unwrap_or_else(|| body.trim().to_string());

        return Err(match status {
            401 | 403 => Error::backend(
                operation,
                format!("Authentication failed: invalid credentials or insufficient permissions. Status: {}", status),
            ),
            429 => Error::backend(
                operation,
                format!("Rate limit exceeded. Status: {}", status),
            ),
            500..=599 => Error::backend(
                operation,
                format!("SOLIDserver error (transient): {} - {}", status, detail),
            ),
            _ => Error::backend(operation, format!("Request failed: {} - {}", status, detail)),
        });
    }

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| Error::backend(operation, format!("Failed to parse response: {}", e)))?;

    if envelope.success == Some(false) {
        return Err(Error::backend(
            operation,
            envelope
                .errmsg
                .unwrap_or_else(|| "backend reported failure".to_string()),
        ));
    }
    Ok(envelope.data)
}

/// `where` clause scoping zones to a smart and optional view
fn zone_filter(smart: &str, view: Option<&str>) -> String {
    let mut clause = format!("server_name='{}'", quote(smart));
    if let Some(view) = view.filter(|v| !v.is_empty()) {
        clause.push_str(&format!(" and view_name='{}'", quote(view)));
    }
    clause
}

/// `where` clause scoping records to a zone and optional name expression
fn record_filter(zone_id: &str, name_filter: Option<&str>) -> String {
    let mut clause = format!("zone_id='{}'", quote(zone_id));
    if let Some(expr) = name_filter {
        clause.push_str(&format!(" and rr_full_name ~ '{}'", quote(expr)));
    }
    clause
}

fn quote(value: &str) -> String {
    value.replace('\'', "''")
}

// SOLIDserver reports numbers as strings on most endpoints, but not all
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
