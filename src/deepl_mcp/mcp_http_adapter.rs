//! HTTP front end for a [`ToolProtocol`].
//!
//! Two endpoints, both `POST` with JSON bodies:
//!
//! - `/tools/list` returns `{"tools": [ToolMetadata, ...]}`
//! - `/tools/execute` takes `{"tool": "...", "parameters": {...}}` and returns
//!   `{"result": envelope}`
//!
//! An unknown tool name or a missing `tool` field answers `400` with
//! `{"error": "..."}`. Handler failures are not HTTP errors: they come back
//! as `200` with `result.success == false`.

use crate::mcp_server_builder::AuthConfig;
use crate::tool_protocol::{ToolError, ToolProtocol};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use log::{debug, info, warn};
use serde_json::{json, Value};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Configuration for an HTTP tool server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Socket address to bind to (e.g., "127.0.0.1:8080"). Port 0 picks a free port.
    pub addr: SocketAddr,
    pub auth: AuthConfig,
}

/// A running HTTP server.
pub struct HttpServerInstance {
    addr: SocketAddr,
    handle: JoinHandle<std::io::Result<()>>,
}

impl HttpServerInstance {
    /// Address actually bound, useful when the configured port was 0.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections.
    pub fn shutdown(self) {
        self.handle.abort();
    }

    /// Wait until the server task ends.
    pub async fn wait(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.handle.await??;
        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    protocol: Arc<dyn ToolProtocol>,
    auth: Arc<AuthConfig>,
}

impl AppState {
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        if self.auth.validate(header) {
            Ok(())
        } else {
            warn!("rejected request with missing or invalid credentials");
            Err(error_response(StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Router serving `protocol`, for embedding in a larger axum application.
pub fn router(protocol: Arc<dyn ToolProtocol>, auth: AuthConfig) -> Router {
    let state = AppState {
        protocol,
        auth: Arc::new(auth),
    };
    Router::new()
        .route("/tools/list", post(list_tools))
        .route("/tools/execute", post(execute_tool))
        .with_state(state)
}

async fn list_tools(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }

    match state.protocol.list_tools().await {
        Ok(tools) => {
            debug!("listing {} tools", tools.len());
            (StatusCode::OK, Json(json!({ "tools": tools }))).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

async fn execute_tool(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }

    let tool_name = match payload.get("tool").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => {
            let message = ToolError::ProtocolError("missing 'tool' field".to_string()).to_string();
            return error_response(StatusCode::BAD_REQUEST, &message);
        }
    };
    let parameters = payload.get("parameters").cloned().unwrap_or(Value::Null);

    let started = std::time::Instant::now();
    match state.protocol.execute(&tool_name, parameters).await {
        Ok(result) => {
            debug!(
                "{} finished in {}ms (success: {})",
                tool_name,
                started.elapsed().as_millis(),
                result.success
            );
            (StatusCode::OK, Json(json!({ "result": result }))).into_response()
        }
        Err(e) => {
            warn!("{} rejected: {}", tool_name, e);
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

/// Bind `config.addr` and serve `protocol` on a background task.
pub async fn serve(
    config: HttpServerConfig,
    protocol: Arc<dyn ToolProtocol>,
) -> Result<HttpServerInstance, Box<dyn Error + Send + Sync>> {
    let protocol_name = protocol.protocol_name().to_string();
    let app = router(protocol, config.auth);

    let listener = TcpListener::bind(config.addr).await?;
    let addr = listener.local_addr()?;
    info!("{} tool server listening on http://{}", protocol_name, addr);

    let handle = tokio::spawn(async move { axum::serve(listener, app).await });
    Ok(HttpServerInstance { addr, handle })
}
