//! Blocking HTTP binding.
//!
//! For hosts that hand requests over on plain threads, [`BlockingGateway`]
//! wraps the shared async pipeline behind a synchronous call. The gateway
//! owns a small current-thread runtime and blocks on the same
//! [`Service::handle_raw`] path the other bindings use, so decode and
//! dispatch semantics are identical.

use axum::http::{header, Request, Response, StatusCode};
use bytes::Bytes;
use hookbridge_core::hookdata::RawEvent;
use hookbridge_core::Service;
use std::sync::Arc;
use tracing::instrument;

/// Errors constructing the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to build runtime: {message}")]
    Runtime { message: String },
}

/// Synchronous adapter over the shared pipeline.
pub struct BlockingGateway {
    service: Arc<Service>,
    runtime: tokio::runtime::Runtime,
}

impl BlockingGateway {
    /// Create a gateway with its own current-thread runtime.
    ///
    /// Must not be called from inside an async context; blocking hosts
    /// have no runtime of their own, which is the point.
    pub fn new(service: Arc<Service>) -> Result<Self, GatewayError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| GatewayError::Runtime {
                message: e.to_string(),
            })?;

        Ok(Self { service, runtime })
    }

    /// Handle one request synchronously.
    ///
    /// Blocks the calling thread for the full decode → normalize →
    /// dispatch flow, outbound sends included.
    #[instrument(skip(self, request))]
    pub fn handle(&self, request: Request<Bytes>) -> Response<String> {
        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let query = crate::parse_query(request.uri().query().unwrap_or(""));

        let raw = RawEvent {
            content_type,
            body: request.into_body(),
            is_base64: false,
            query,
        };

        let response = self.runtime.block_on(self.service.handle_raw(raw));
        let status =
            StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_string(&response)
            .unwrap_or_else(|_| r#"{"status_code":500,"errors":[]}"#.to_string());

        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(String::new());
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

#[cfg(test)]
#[path = "blocking_tests.rs"]
mod tests;
