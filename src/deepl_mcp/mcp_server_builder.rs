//! Tool server builder
//!
//! Wires a [`ToolProtocol`] to the HTTP adapter with optional bearer-token
//! authentication.
//!
//! # Example
//!
//! ```rust,ignore
//! use deepl_mcp::mcp_server_builder::ToolServerBuilder;
//!
//! let server = ToolServerBuilder::new(protocol)
//!     .with_bearer_token("my-secret-token")
//!     .start_on(8080)
//!     .await?;
//! println!("Server running at {}", server.addr());
//! ```

use crate::config::ServerConfig;
use crate::mcp_http_adapter::{self, HttpServerConfig, HttpServerInstance};
use crate::tool_protocol::ToolProtocol;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Authentication required from callers.
#[derive(Clone, PartialEq)]
pub enum AuthConfig {
    /// No authentication required
    None,
    /// `Authorization: Bearer <token>`
    Bearer(String),
}

impl AuthConfig {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Check an `Authorization` header value against the configured scheme.
    pub fn validate(&self, header: &str) -> bool {
        match self {
            AuthConfig::None => true,
            AuthConfig::Bearer(token) => match header.strip_prefix("Bearer ") {
                // Fixed-length digests compared in constant time.
                Some(provided) => {
                    let expected_hash = Sha256::digest(token.as_bytes());
                    let provided_hash = Sha256::digest(provided.as_bytes());
                    expected_hash.ct_eq(&provided_hash).into()
                }
                None => false,
            },
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig::None
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::None => f.write_str("None"),
            AuthConfig::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// Fluent setup for an HTTP tool server.
pub struct ToolServerBuilder {
    protocol: Arc<dyn ToolProtocol>,
    auth: AuthConfig,
}

impl ToolServerBuilder {
    /// No authentication until configured.
    pub fn new(protocol: Arc<dyn ToolProtocol>) -> Self {
        Self {
            protocol,
            auth: AuthConfig::None,
        }
    }

    /// Require `Authorization: Bearer <token>` on every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthConfig::bearer(token);
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Start on localhost at `port`.
    pub async fn start_on(self, port: u16) -> Result<HttpServerInstance, Box<dyn Error + Send + Sync>> {
        self.start_at(SocketAddr::from(([127, 0, 0, 1], port))).await
    }

    pub async fn start_at(self, addr: SocketAddr) -> Result<HttpServerInstance, Box<dyn Error + Send + Sync>> {
        let config = HttpServerConfig {
            addr,
            auth: self.auth,
        };
        mcp_http_adapter::serve(config, self.protocol).await
    }

    /// Start with the address and token from a [`ServerConfig`].
    pub async fn start_with(
        mut self,
        config: &ServerConfig,
    ) -> Result<HttpServerInstance, Box<dyn Error + Send + Sync>> {
        if let Some(token) = &config.bearer_token {
            self.auth = AuthConfig::bearer(token.clone());
        }
        self.start_at(config.addr).await
    }
}
