// src/deepl_mcp/mod.rs

pub mod analysis;
pub mod clients;
pub mod config;
pub mod history;
pub mod provider;
pub mod session;
pub mod tool_protocol;
pub mod tool_protocols;
pub mod tools;
pub mod usage_cache;

#[cfg(feature = "mcp-server")]
pub mod mcp_http_adapter;
#[cfg(feature = "mcp-server")]
pub mod mcp_server_builder;

// Export the session and protocol so callers can write deepl_mcp::TranslationSession
pub use session::TranslationSession;
pub use tool_protocols::DeepLProtocol;
