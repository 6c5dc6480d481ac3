//! # Hookbridge Transport Bindings
//!
//! Three host transports over the same pipeline:
//!
//! - the event-loop HTTP server in this module (axum),
//! - [`proxy`] — a FaaS-style structured proxy event in and out,
//! - [`blocking`] — a synchronous entry point for blocking hosts.
//!
//! Every binding does exactly two transport-specific things: build a
//! [`RawEvent`] from its native request, and render the resulting
//! [`ResponseInfo`] into its native response. The pipeline in between is
//! [`Service::handle_raw`], shared verbatim, which is what makes body
//! decoding transport-independent.

pub mod blocking;
pub mod proxy;

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use hookbridge_core::hookdata::RawEvent;
use hookbridge_core::service::INFO_BODY;
use hookbridge_core::{ResponseInfo, Service};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

// ============================================================================
// Errors
// ============================================================================

/// Failures starting or running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to bind {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("server failed: {message}")]
    ServerFailed { message: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the axum binding.
#[derive(Clone)]
pub struct AppState {
    /// The routing/dispatch pipeline, built once at startup.
    pub service: Arc<Service>,
}

// ============================================================================
// HTTP Server (event-loop binding)
// ============================================================================

/// Create the HTTP router with all endpoints.
///
/// `/hook` and `/webhook` are aliases, each registered with and without a
/// trailing slash; webhook senders are inconsistent about which they call.
pub fn create_router(service: Arc<Service>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health_check))
        .route("/hook", post(handle_hook))
        .route("/hook/", post(handle_hook))
        .route("/webhook", post(handle_hook))
        .route("/webhook/", post(handle_hook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server with graceful shutdown on SIGINT/SIGTERM.
pub async fn start_server(service: Arc<Service>) -> Result<(), ServiceError> {
    let port = service.config().port;
    let app = create_router(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: addr.to_string(),
                message: e.to_string(),
            })?;

    info!("Starting HTTP server on {}", addr);

    let shutdown_signal = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C signal handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
            },
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown");
            },
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle one inbound webhook request.
#[instrument(skip(state, headers, body))]
async fn handle_hook(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<ResponseInfo>) {
    let raw = RawEvent {
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
        is_base64: false,
        query: parse_query(query.as_deref().unwrap_or("")),
    };

    let response = state.service.handle_raw(raw).await;
    render_response(response)
}

/// Static informational landing page.
async fn handle_index() -> &'static str {
    INFO_BODY
}

/// Liveness response for the health endpoint.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check endpoint.
async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Decode a raw query string into ordered pairs.
pub(crate) fn parse_query(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Convert the envelope's rollup code into an HTTP status and JSON body.
fn render_response(response: ResponseInfo) -> (StatusCode, Json<ResponseInfo>) {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
