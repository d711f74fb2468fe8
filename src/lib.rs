//! # deepl-mcp
//!
//! A tool server that puts the DeepL translation API behind a uniform
//! request/response contract for tool-calling agents.
//!
//! The crate is layered leaves first:
//!
//! * **Provider**: [`provider::TranslationProvider`] is the adapter contract;
//!   [`clients::deepl::DeepLClient`] implements it over the DeepL v2 HTTP API.
//! * **Session**: [`TranslationSession`] is the context object shared by all
//!   handlers. It owns the provider, a bounded [`history`] of operations and a
//!   short-lived [`usage_cache`].
//! * **Tools**: the handlers in [`tools`] turn arguments into provider calls and
//!   provider results into [`tool_protocol::ToolResult`] envelopes. They never
//!   return `Err`.
//! * **Protocol and transport**: [`DeepLProtocol`] routes tool names to handlers
//!   through the [`tool_protocol::ToolProtocol`] trait, and (with the
//!   `mcp-server` feature) `mcp_server_builder` serves it over HTTP.
//!
//! ## Calling a tool directly
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use deepl_mcp::clients::deepl::DeepLClient;
//! use deepl_mcp::config::DeepLConfig;
//! use deepl_mcp::tools::translation::{translate_text, TranslateTextRequest};
//! use deepl_mcp::TranslationSession;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     deepl_mcp::init_logger();
//!
//!     let client = DeepLClient::connect(DeepLConfig::from_env()?).await?;
//!     let session = TranslationSession::new(Arc::new(client));
//!
//!     let result = translate_text(&session, TranslateTextRequest::new("Hello world", "de")).await;
//!     assert!(result.success);
//!     println!("{}", result.get("translated_text").unwrap());
//!     Ok(())
//! }
//! ```
//!
//! ## Serving the tools over HTTP
//!
//! ```rust,ignore
//! use deepl_mcp::mcp_server_builder::ToolServerBuilder;
//!
//! let server = ToolServerBuilder::new(Arc::new(DeepLProtocol::new(session)))
//!     .with_bearer_token("my-secret-token")
//!     .start_on(8080)
//!     .await?;
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Filtering follows `RUST_LOG`. Calling it again is a no-op.
///
/// ```rust
/// deepl_mcp::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

pub mod deepl_mcp;

// Re-exporting key items for easier external access.
pub use deepl_mcp::analysis;
pub use deepl_mcp::clients;
pub use deepl_mcp::config;
pub use deepl_mcp::config::{DeepLConfig, ServerConfig, SessionSettings};
pub use deepl_mcp::history;
pub use deepl_mcp::provider;
pub use deepl_mcp::provider::{ProviderError, ProviderResult, TranslationProvider};
pub use deepl_mcp::session;
pub use deepl_mcp::session::TranslationSession;
pub use deepl_mcp::usage_cache;

// Re-export tool protocol and handlers
pub use deepl_mcp::tool_protocol;
pub use deepl_mcp::tool_protocols;
pub use deepl_mcp::tool_protocols::DeepLProtocol;
pub use deepl_mcp::tools;

#[cfg(feature = "mcp-server")]
pub use deepl_mcp::mcp_http_adapter;
#[cfg(feature = "mcp-server")]
pub use deepl_mcp::mcp_server_builder;
