// # eipdnsd - EfficientIP DNS adapter daemon
//
// Thin integration layer: all DNS logic lives in eipdns-core.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging
// 3. Building the domain filter and the SOLIDserver-backed provider
// 4. Holding the provider until SIGINT/SIGTERM
//
// ## Configuration
//
// ### Backend
// - `EIP_HOST`, `EIP_PORT`: SOLIDserver address (default localhost:443)
// - `EIP_WAPI_USER`, `EIP_WAPI_PASSWORD`: basic authentication
// - `EIP_WAPI_TOKEN_ID`, `EIP_WAPI_TOKEN_SECRET`: token authentication
// - `EIP_SMART`: smart architecture to manage (required)
// - `EIP_VIEW`: DNS view (optional)
// - `EIP_SSL_VERIFY`: validate TLS certificates (default true)
// - `EIP_HTTP_TIMEOUT_SECS`: per-request timeout (default 30)
//
// ### Reconciliation
// - `EIP_DRY_RUN`: only log changes (default false)
// - `EIP_MAX_RESULTS`: listing page size (default 1500)
// - `EIP_CREATE_PTR`: mark A records as carrying a PTR record (default false)
// - `EIP_DEFAULT_TTL`: TTL for endpoints without one (default 300)
//
// ### Filters
// - `DOMAIN_FILTER`, `EXCLUDE_DOMAIN_FILTER`: comma-separated suffixes
// - `REGEXP_DOMAIN_FILTER`, `REGEXP_DOMAIN_FILTER_EXCLUSION`: regex pair
// - `REGEXP_NAME_FILTER`: record name filter forwarded to the backend
//
// ### Logging
// - `LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `LOG_FORMAT`: text or json (default text)
//
// ## Example
//
// ```bash
// export EIP_HOST=sds.example.net
// export EIP_WAPI_USER=ipmadmin
// export EIP_WAPI_PASSWORD=...
// export EIP_SMART=smart1
// export DOMAIN_FILTER=example.com
//
// eipdnsd
// ```

use anyhow::{Context, Result};
use eipdns_core::{
    CancellationToken, Credentials, DomainFilter, DomainFilterConfig, EfficientIpConfig, Provider,
};
use std::process::ExitCode;
use tracing::{Level, error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

/// Everything read from the environment
#[derive(Debug)]
struct Settings {
    provider: EfficientIpConfig,
    filters: DomainFilterConfig,
    log_level: Level,
    log_format: LogFormat,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through `lookup`; empty values count as unset
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let credentials = Credentials::select(
            var("EIP_WAPI_USER"),
            var("EIP_WAPI_PASSWORD"),
            var("EIP_WAPI_TOKEN_ID"),
            var("EIP_WAPI_TOKEN_SECRET"),
        )?;
        let smart = var("EIP_SMART")
            .context("EIP_SMART is required. Set it via: export EIP_SMART=<smart name>")?;

        let mut provider = EfficientIpConfig::new(smart, credentials);
        if let Some(host) = var("EIP_HOST") {
            provider.host = host;
        }
        if let Some(port) = var("EIP_PORT") {
            provider.port = parse_number("EIP_PORT", &port)?;
        }
        provider.view = var("EIP_VIEW");
        if let Some(v) = var("EIP_SSL_VERIFY") {
            provider.ssl_verify = parse_bool("EIP_SSL_VERIFY", &v)?;
        }
        if let Some(v) = var("EIP_DRY_RUN") {
            provider.dry_run = parse_bool("EIP_DRY_RUN", &v)?;
        }
        if let Some(v) = var("EIP_MAX_RESULTS") {
            provider.max_results = parse_number("EIP_MAX_RESULTS", &v)?;
        }
        if let Some(v) = var("EIP_CREATE_PTR") {
            provider.create_ptr = parse_bool("EIP_CREATE_PTR", &v)?;
        }
        if let Some(v) = var("EIP_DEFAULT_TTL") {
            provider.default_ttl = parse_number("EIP_DEFAULT_TTL", &v)?;
        }
        if let Some(v) = var("EIP_HTTP_TIMEOUT_SECS") {
            provider.http_timeout_secs = parse_number("EIP_HTTP_TIMEOUT_SECS", &v)?;
        }

        let filters = DomainFilterConfig {
            domain_filter: parse_list(var("DOMAIN_FILTER")),
            exclude_domains: parse_list(var("EXCLUDE_DOMAIN_FILTER")),
            regex_domain_filter: var("REGEXP_DOMAIN_FILTER").unwrap_or_default(),
            regex_domain_exclusion: var("REGEXP_DOMAIN_FILTER_EXCLUSION").unwrap_or_default(),
        };
        provider.name_regex = var("REGEXP_NAME_FILTER").unwrap_or_default();

        provider.validate()?;

        let log_level = match var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()).to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ),
        };
        let log_format = match var("LOG_FORMAT").unwrap_or_else(|| "text".to_string()).to_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => anyhow::bail!("LOG_FORMAT '{}' is not valid. Valid formats: text, json", other),
        };

        Ok(Self {
            provider,
            filters,
            log_level,
            log_format,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => anyhow::bail!("{} must be a boolean (true/false). Got: {}", key, value),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer. Got: {}", key, value))
}

fn parse_list(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn init_tracing(level: Level, format: LogFormat) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_max_level(level);
    let result = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    result.context("Failed to set tracing subscriber")
}

fn main() -> ExitCode {
    // Load configuration from environment
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    if let Err(e) = init_tracing(settings.log_level, settings.log_format) {
        eprintln!("{:#}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting eipdnsd {}", env!("CARGO_PKG_VERSION"));

    let filter = match DomainFilter::try_from(&settings.filters) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    let provider = match eipdns_solidserver::build_provider(settings.provider, filter) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("Failed to initialize provider: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(&provider).await {
            error!("Daemon error: {:#}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(provider: &dyn Provider) -> Result<()> {
    let cancel = CancellationToken::new();

    // Startup probe; a failure is logged and the daemon keeps serving
    tokio::select! {
        result = provider.records(&cancel) => match result {
            Ok(endpoints) => info!("Backend reachable: {} record(s) in scope", endpoints.len()),
            Err(e) => warn!("Initial record listing failed: {}", e),
        },
        signal = wait_for_shutdown() => {
            info!("Received shutdown signal during startup: {}", signal?);
            cancel.cancel();
            return Ok(());
        }
    }

    info!("Provider ready");

    let signal = wait_for_shutdown().await?;
    info!("Received shutdown signal: {}", signal);
    cancel.cancel();
    info!("Shutting down daemon");

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("EIP_WAPI_USER", "ipmadmin"),
        ("EIP_WAPI_PASSWORD", "secret"),
        ("EIP_SMART", "smart1"),
    ];

    #[test]
    fn test_defaults() {
        let s = settings(&REQUIRED).unwrap();

        assert_eq!(s.provider.host, "localhost");
        assert_eq!(s.provider.port, 443);
        assert_eq!(s.provider.smart, "smart1");
        assert_eq!(s.provider.view, None);
        assert!(s.provider.ssl_verify);
        assert!(!s.provider.dry_run);
        assert_eq!(s.provider.max_results, 1500);
        assert!(!s.provider.create_ptr);
        assert_eq!(s.provider.default_ttl, 300);
        assert_eq!(s.filters, DomainFilterConfig::default());
        assert_eq!(s.log_level, Level::INFO);
        assert_eq!(s.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("EIP_HOST", "sds.example.net"),
            ("EIP_PORT", "8443"),
            ("EIP_VIEW", "internal"),
            ("EIP_SSL_VERIFY", "false"),
            ("EIP_DRY_RUN", "yes"),
            ("EIP_MAX_RESULTS", "200"),
            ("EIP_CREATE_PTR", "1"),
            ("EIP_DEFAULT_TTL", "600"),
            ("EIP_HTTP_TIMEOUT_SECS", "5"),
            ("DOMAIN_FILTER", "example.com, example.org ,"),
            ("EXCLUDE_DOMAIN_FILTER", "lab.example.com"),
            ("REGEXP_NAME_FILTER", "^app-"),
            ("LOG_LEVEL", "DEBUG"),
            ("LOG_FORMAT", "json"),
        ]);
        let s = settings(&vars).unwrap();

        assert_eq!(s.provider.host, "sds.example.net");
        assert_eq!(s.provider.port, 8443);
        assert_eq!(s.provider.view.as_deref(), Some("internal"));
        assert!(!s.provider.ssl_verify);
        assert!(s.provider.dry_run);
        assert_eq!(s.provider.max_results, 200);
        assert!(s.provider.create_ptr);
        assert_eq!(s.provider.default_ttl, 600);
        assert_eq!(s.provider.http_timeout_secs, 5);
        assert_eq!(s.provider.name_regex, "^app-");
        assert_eq!(s.filters.domain_filter, vec!["example.com", "example.org"]);
        assert_eq!(s.filters.exclude_domains, vec!["lab.example.com"]);
        assert_eq!(s.log_level, Level::DEBUG);
        assert_eq!(s.log_format, LogFormat::Json);
    }

    #[test]
    fn test_token_credentials() {
        let s = settings(&[
            ("EIP_WAPI_TOKEN_ID", "tok"),
            ("EIP_WAPI_TOKEN_SECRET", "sec"),
            ("EIP_SMART", "smart1"),
        ])
        .unwrap();
        assert!(matches!(s.provider.credentials, Credentials::Token { .. }));
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = settings(&[("EIP_SMART", "smart1"), ("EIP_WAPI_USER", "ipmadmin")]).unwrap_err();
        assert!(err.to_string().contains("missing authentication credentials"));
    }

    #[test]
    fn test_missing_smart_rejected() {
        assert!(settings(&REQUIRED[..2]).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("EIP_PORT", "https"),
            ("EIP_SSL_VERIFY", "maybe"),
            ("EIP_MAX_RESULTS", "0"),
            ("EIP_DEFAULT_TTL", "-1"),
            ("LOG_LEVEL", "verbose"),
            ("LOG_FORMAT", "xml"),
        ] {
            let mut vars = REQUIRED.to_vec();
            vars.push((key, value));
            assert!(settings(&vars).is_err(), "{}={} should be rejected", key, value);
        }
    }

    #[test]
    fn test_regex_filter_selected() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("DOMAIN_FILTER", "example.com"),
            ("REGEXP_DOMAIN_FILTER", r"\.org$"),
        ]);
        let s = settings(&vars).unwrap();
        let filter = DomainFilter::try_from(&s.filters).unwrap();

        assert!(filter.matches("example.org"));
        assert!(!filter.matches("example.com"));
    }

    #[test]
    fn test_invalid_regex_is_startup_error() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("REGEXP_DOMAIN_FILTER", "("));
        let s = settings(&vars).unwrap();

        assert!(DomainFilter::try_from(&s.filters).is_err());
    }
}
