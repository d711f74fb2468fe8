//! DeepL tool server.
//!
//! Reads its configuration from the environment (a `.env` file is honoured):
//!
//! - `DEEPL_AUTH_KEY` (required)
//! - `DEEPL_SERVER_URL` (default `https://api-free.deepl.com`)
//! - `DEEPL_DOCUMENT_TIMEOUT_SECS` (default 600)
//! - `DEEPL_MCP_ADDR` (default `127.0.0.1:8080`)
//! - `DEEPL_MCP_BEARER_TOKEN` (optional)
//!
//! Exits with a non-zero status when the credential is missing or the DeepL
//! connectivity check fails.

use deepl_mcp::clients::deepl::DeepLClient;
use deepl_mcp::config::{DeepLConfig, ServerConfig, SessionSettings};
use deepl_mcp::mcp_server_builder::ToolServerBuilder;
use deepl_mcp::{DeepLProtocol, TranslationSession};
use log::{error, info};
use std::error::Error;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    deepl_mcp::init_logger();

    if let Err(e) = run().await {
        error!("{}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let deepl_config = DeepLConfig::from_env()?;
    let settings = SessionSettings::from_env()?;
    let server_config = ServerConfig::from_env()?;

    let client = DeepLClient::connect(deepl_config).await?;
    let session = Arc::new(TranslationSession::with_settings(Arc::new(client), settings));
    let protocol = Arc::new(DeepLProtocol::new(session));

    let server = ToolServerBuilder::new(protocol)
        .start_with(&server_config)
        .await?;
    info!("DeepL tool server running on http://{}", server.addr());

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    server.shutdown();
    Ok(())
}
