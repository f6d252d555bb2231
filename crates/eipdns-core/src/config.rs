//! Configuration types for the EfficientIP adapter
//!
//! Configuration is an immutable snapshot built once at startup (the daemon
//! reads it from the environment) and handed to the provider by value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Backend authentication
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// HTTP basic authentication
    Basic {
        username: String,
        password: String,
    },

    /// API token pair
    Token {
        token: String,
        secret: String,
    },
}

impl Credentials {
    /// Pick the authentication mode from the optional pairs
    ///
    /// A complete token pair wins; otherwise a complete username/password
    /// pair is required.
    pub fn select(
        username: Option<String>,
        password: Option<String>,
        token: Option<String>,
        secret: Option<String>,
    ) -> Result<Self, crate::Error> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());

        if present(&token) && present(&secret) {
            return Ok(Credentials::Token {
                token: token.unwrap_or_default(),
                secret: secret.unwrap_or_default(),
            });
        }
        if present(&username) && present(&password) {
            return Ok(Credentials::Basic {
                username: username.unwrap_or_default(),
                password: password.unwrap_or_default(),
            });
        }
        Err(crate::Error::config(
            "missing authentication credentials. Login/password or access token/secret are required",
        ))
    }

    /// Validate the credentials
    pub fn validate(&self) -> Result<(), crate::Error> {
        let complete = match self {
            Credentials::Basic { username, password } => !username.is_empty() && !password.is_empty(),
            Credentials::Token { token, secret } => !token.is_empty() && !secret.is_empty(),
        };
        if !complete {
            return Err(crate::Error::config("incomplete authentication credentials"));
        }
        Ok(())
    }
}

// Secrets never reach logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<REDACTED>")
                .finish(),
            Credentials::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"<REDACTED>")
                .field("secret", &"<REDACTED>")
                .finish(),
        }
    }
}

/// Backend and reconciliation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficientIpConfig {
    /// SOLIDserver host
    #[serde(default = "default_host")]
    pub host: String,

    /// SOLIDserver HTTPS port
    #[serde(default = "default_port")]
    pub port: u16,

    pub credentials: Credentials,

    /// Smart architecture whose zones are managed (required)
    pub smart: String,

    /// Optional DNS view narrowing the zone listing
    #[serde(default)]
    pub view: Option<String>,

    /// When false, TLS certificates are not validated
    #[serde(default = "default_true")]
    pub ssl_verify: bool,

    /// When true, changes are only logged
    #[serde(default)]
    pub dry_run: bool,

    /// Page size cap for listings
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Mark A records as carrying a companion PTR record
    #[serde(default)]
    pub create_ptr: bool,

    /// TTL applied to endpoints that have none
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    /// Timeout for each backend request
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Record name filter, forwarded to backend-side filtering as-is
    #[serde(default)]
    pub name_regex: String,
}

impl EfficientIpConfig {
    /// Create a configuration with defaults for everything but the required fields
    pub fn new(smart: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            credentials,
            smart: smart.into(),
            view: None,
            ssl_verify: true,
            dry_run: false,
            max_results: default_max_results(),
            create_ptr: false,
            default_ttl: default_ttl(),
            http_timeout_secs: default_http_timeout_secs(),
            name_regex: String::new(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.host.trim().is_empty() {
            return Err(crate::Error::config("EfficientIP host cannot be empty"));
        }
        if self.port == 0 {
            return Err(crate::Error::config("EfficientIP port must be > 0"));
        }
        if self.smart.trim().is_empty() {
            return Err(crate::Error::config("EfficientIP smart name is required"));
        }
        if self.max_results == 0 {
            return Err(crate::Error::config("max results must be > 0"));
        }
        if self.http_timeout_secs == 0 {
            return Err(crate::Error::config("HTTP timeout must be > 0"));
        }
        self.credentials.validate()
    }

    /// View selector, treating an empty string as unset
    pub fn view(&self) -> Option<&str> {
        self.view.as_deref().filter(|v| !v.is_empty())
    }

    /// Request timeout
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Domain filter expressions
///
/// The regex pair is active when `regex_domain_filter` is non-empty,
/// otherwise the suffix lists are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainFilterConfig {
    #[serde(default)]
    pub domain_filter: Vec<String>,

    #[serde(default)]
    pub exclude_domains: Vec<String>,

    #[serde(default)]
    pub regex_domain_filter: String,

    #[serde(default)]
    pub regex_domain_exclusion: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_true() -> bool {
    true
}

fn default_max_results() -> u32 {
    1500
}

fn default_ttl() -> u32 {
    300
}

fn default_http_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic() -> Credentials {
        Credentials::Basic {
            username: "ipmadmin".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = EfficientIpConfig::new("smart1", basic());

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 443);
        assert!(config.ssl_verify);
        assert!(!config.dry_run);
        assert_eq!(config.max_results, 1500);
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_smart() {
        let config = EfficientIpConfig::new("  ", basic());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = EfficientIpConfig::new("smart1", basic());
        config.max_results = 0;
        assert!(config.validate().is_err());

        let mut config = EfficientIpConfig::new("smart1", basic());
        config.http_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_selection() {
        let some = |s: &str| Some(s.to_string());

        let creds = Credentials::select(some("u"), some("p"), some("t"), some("s")).unwrap();
        assert!(matches!(creds, Credentials::Token { .. }));

        let creds = Credentials::select(some("u"), some("p"), some("t"), None).unwrap();
        assert!(matches!(creds, Credentials::Basic { .. }));

        assert!(Credentials::select(some("u"), None, None, some("s")).is_err());
        assert!(Credentials::select(None, None, None, None).is_err());
        assert!(Credentials::select(some(""), some(""), None, None).is_err());
    }

    #[test]
    fn test_empty_view_is_unset() {
        let mut config = EfficientIpConfig::new("smart1", basic());
        config.view = Some(String::new());
        assert_eq!(config.view(), None);

        config.view = Some("internal".to_string());
        assert_eq!(config.view(), Some("internal"));
    }

    #[test]
    fn test_secrets_not_exposed_in_debug() {
        let config = EfficientIpConfig::new("smart1", basic());
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("ipmadmin"));
        assert!(!debug_str.contains("hunter2"));

        let token = Credentials::Token {
            token: "tok-123".to_string(),
            secret: "sec-456".to_string(),
        };
        let debug_str = format!("{:?}", token);
        assert!(!debug_str.contains("tok-123"));
        assert!(!debug_str.contains("sec-456"));
    }
}
