//! Configuration for the DeepL tool server.
//!
//! Three plain structs cover the moving parts:
//!
//! * [`DeepLConfig`] – credential and endpoint for the DeepL API.
//! * [`SessionSettings`] – history bound, usage cache lifetime and document limits.
//! * [`ServerConfig`] – where the HTTP tool server listens and how it authenticates.
//!
//! All of them can be built by hand; the `from_env` helpers read the
//! conventional environment variables.
//!
//! # Example
//!
//! ```rust
//! use deepl_mcp::config::{DeepLConfig, SessionSettings};
//!
//! let config = DeepLConfig::new("my-key:fx");
//! assert_eq!(config.server_url, "https://api-free.deepl.com");
//!
//! let settings = SessionSettings::default();
//! assert_eq!(settings.history_limit, 100);
//! ```

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Environment variable holding the DeepL authentication key.
pub const AUTH_KEY_VAR: &str = "DEEPL_AUTH_KEY";
/// Environment variable overriding the DeepL endpoint.
pub const SERVER_URL_VAR: &str = "DEEPL_SERVER_URL";
/// Environment variable overriding the document translation timeout (seconds).
pub const DOCUMENT_TIMEOUT_VAR: &str = "DEEPL_DOCUMENT_TIMEOUT_SECS";
/// Environment variable with the tool server bind address.
pub const SERVER_ADDR_VAR: &str = "DEEPL_MCP_ADDR";
/// Environment variable with the optional bearer token for the tool server.
pub const BEARER_TOKEN_VAR: &str = "DEEPL_MCP_BEARER_TOKEN";

/// Free tier endpoint, used unless overridden.
pub const DEFAULT_SERVER_URL: &str = "https://api-free.deepl.com";

/// Errors raised while assembling configuration. All of them are fatal at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    MissingVar(&'static str),
    /// A variable is present but could not be parsed.
    InvalidValue { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar(var) => {
                write!(f, "{} environment variable is required", var)
            }
            ConfigError::InvalidValue { var, value } => {
                write!(f, "Invalid value for {}: {}", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Credential and endpoint for the DeepL API.
#[derive(Clone, PartialEq)]
pub struct DeepLConfig {
    /// DeepL authentication key.
    pub auth_key: String,
    /// Base URL of the API, without the `/v2` suffix.
    pub server_url: String,
}

impl DeepLConfig {
    /// Config for `auth_key` against the free tier endpoint.
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self {
            auth_key: auth_key.into(),
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }

    /// Point the client at another endpoint (e.g. `https://api.deepl.com`).
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Read `DEEPL_AUTH_KEY` (required) and `DEEPL_SERVER_URL` (optional).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`DeepLConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_key = non_empty(lookup(AUTH_KEY_VAR)).ok_or(ConfigError::MissingVar(AUTH_KEY_VAR))?;
        let mut config = Self::new(auth_key);
        if let Some(url) = non_empty(lookup(SERVER_URL_VAR)) {
            config.server_url = url;
        }
        Ok(config)
    }
}

impl fmt::Debug for DeepLConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepLConfig")
            .field("auth_key", &"<redacted>")
            .field("server_url", &self.server_url)
            .finish()
    }
}

/// Tunables for a [`TranslationSession`](crate::session::TranslationSession).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Maximum number of history entries kept in memory.
    pub history_limit: usize,
    /// How long a fetched usage report is served from cache.
    pub usage_cache_ttl: Duration,
    /// Delay between document status polls.
    pub document_poll_interval: Duration,
    /// Upper bound on the total wait for one document translation.
    pub document_timeout: Duration,
    /// Largest document accepted for upload, in bytes.
    pub max_document_bytes: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            history_limit: 100,
            usage_cache_ttl: Duration::from_secs(5 * 60),
            document_poll_interval: Duration::from_secs(1),
            document_timeout: Duration::from_secs(10 * 60),
            max_document_bytes: 20 * 1024 * 1024,
        }
    }
}

impl SessionSettings {
    /// Defaults, with `DEEPL_DOCUMENT_TIMEOUT_SECS` applied when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(raw) = non_empty(env::var(DOCUMENT_TIMEOUT_VAR).ok()) {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: DOCUMENT_TIMEOUT_VAR,
                value: raw.clone(),
            })?;
            settings.document_timeout = Duration::from_secs(secs);
        }
        Ok(settings)
    }
}

/// Where the HTTP tool server listens and how callers authenticate.
#[derive(Clone, PartialEq)]
pub struct ServerConfig {
    /// Socket address to bind to.
    pub addr: SocketAddr,
    /// Optional bearer token required on every request.
    pub bearer_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            bearer_token: None,
        }
    }
}

impl ServerConfig {
    /// Read `DEEPL_MCP_ADDR` and `DEEPL_MCP_BEARER_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = non_empty(env::var(SERVER_ADDR_VAR).ok()) {
            config.addr = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: SERVER_ADDR_VAR,
                value: raw.clone(),
            })?;
        }
        config.bearer_token = non_empty(env::var(BEARER_TOKEN_VAR).ok());
        Ok(config)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("addr", &self.addr)
            .field("has_bearer_token", &self.bearer_token.is_some())
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
