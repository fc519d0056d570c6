//! Configuration loading and management
//!
//! Configuration is read from an optional YAML file, then environment
//! variables override individual fields:
//!
//! ```yaml
//! bind_address: 0.0.0.0:8080
//! auth:
//!   domain: casting.eu.auth0.com
//!   audience: casting
//!   client_id: abc123
//!   login_results_url: http://localhost:8080/login-results
//! database_url: postgres://casting@localhost/casting
//! ```

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::core::jwks::REFRESH_COOLDOWN;

/// Configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration field `{field}` (env `{env}`)")]
    Missing {
        field: &'static str,
        env: &'static str,
    },

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_algorithms() -> Vec<Algorithm> {
    vec![Algorithm::RS256]
}

fn default_jwks_ttl_secs() -> u64 {
    600
}

/// Identity authority settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Authority domain, e.g. `casting.eu.auth0.com`
    #[serde(default)]
    pub domain: String,

    /// Expected `aud` claim
    #[serde(default)]
    pub audience: String,

    /// Client id used by the login redirect
    #[serde(default)]
    pub client_id: String,

    /// Client secret; read for completeness, never logged or written back
    #[serde(default, skip_serializing)]
    pub client_secret: String,

    /// Where the authority sends the browser after login
    #[serde(default)]
    pub login_results_url: String,

    /// Accepted token signing algorithms
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<Algorithm>,

    /// How long a fetched key set stays fresh, at least the refresh cooldown
    #[serde(default = "default_jwks_ttl_secs")]
    pub jwks_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            audience: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            login_results_url: String::new(),
            algorithms: default_algorithms(),
            jwks_ttl_secs: default_jwks_ttl_secs(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("domain", &self.domain)
            .field("audience", &self.audience)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("login_results_url", &self.login_results_url)
            .field("algorithms", &self.algorithms)
            .field("jwks_ttl_secs", &self.jwks_ttl_secs)
            .finish()
    }
}

impl AuthConfig {
    /// Expected `iss` claim: `https://<domain>/`
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    /// Key set location: `https://<domain>/.well-known/jwks.json`
    pub fn jwks_url(&self) -> Result<Url, ConfigError> {
        self.authority_url("/.well-known/jwks.json")
    }

    /// Login page of the authority, with the query the browser flow expects
    pub fn authorize_url(&self) -> Result<Url, ConfigError> {
        let mut url = self.authority_url("/authorize")?;
        url.query_pairs_mut()
            .append_pair("audience", &self.audience)
            .append_pair("response_type", "token")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.login_results_url);
        Ok(url)
    }

    pub fn jwks_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_ttl_secs)
    }

    fn authority_url(&self, path: &str) -> Result<Url, ConfigError> {
        Url::parse(&format!("https://{}{}", self.domain, path)).map_err(|e| {
            ConfigError::Invalid {
                field: "auth.domain",
                reason: e.to_string(),
            }
        })
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default)]
    pub auth: AuthConfig,

    /// PostgreSQL connection string; the in-memory store is used when unset
    #[serde(default)]
    pub database_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            auth: AuthConfig::default(),
            database_url: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from an optional YAML file, apply the process environment and validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let config = config.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from an environment lookup
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup("CASTING_BIND") {
            self.bind_address = value;
        }
        if let Some(value) = lookup("AUTH0_DOMAIN") {
            self.auth.domain = value;
        }
        if let Some(value) = lookup("API_AUDIENCE") {
            self.auth.audience = value;
        }
        if let Some(value) = lookup("CLIENT_ID") {
            self.auth.client_id = value;
        }
        if let Some(value) = lookup("CLIENT_SECRET") {
            self.auth.client_secret = value;
        }
        if let Some(value) = lookup("LOGIN_RESULTS") {
            self.auth.login_results_url = value;
        }
        if let Some(value) = lookup("JWKS_TTL_SECS") {
            self.auth.jwks_ttl_secs = value.trim().parse().map_err(|e| ConfigError::Invalid {
                field: "auth.jwks_ttl_secs",
                reason: format!("`{value}` is not a number of seconds: {e}"),
            })?;
        }
        if let Some(value) = lookup("DATABASE_URL") {
            self.database_url = Some(value);
        }
        Ok(self)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.domain.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "auth.domain",
                env: "AUTH0_DOMAIN",
            });
        }
        if self.auth.audience.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "auth.audience",
                env: "API_AUDIENCE",
            });
        }
        if self.auth.algorithms.is_empty() {
            return Err(ConfigError::Invalid {
                field: "auth.algorithms",
                reason: "at least one algorithm is required".to_string(),
            });
        }
        if self.auth.jwks_ttl() < REFRESH_COOLDOWN {
            return Err(ConfigError::Invalid {
                field: "auth.jwks_ttl_secs",
                reason: format!(
                    "must be at least {} seconds",
                    REFRESH_COOLDOWN.as_secs()
                ),
            });
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Parsed bind address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                field: "bind_address",
                reason: e.to_string(),
            })
    }
}
