//! Top-level request routing.
//!
//! [`Service`] owns the routing-key → [`Handler`] registry, the token
//! allow-list check, and the shared [`handle_raw`](Service::handle_raw)
//! entry point every transport binding calls. The registry is resolved
//! once at startup into an immutable lookup table; requests only read it.

use crate::config::ServiceConfig;
use crate::handler::Handler;
use crate::hookdata::{HookData, QueryParams, RawEvent};
use crate::{ErrorInfo, ResponseInfo};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// Informational body returned by `GET /`.
pub const INFO_BODY: &str = "hookbridge: POST /hook?inputType=<source> to convert \
and fan out webhook events. See the project README for query parameters.";

/// Immutable routing table plus shared configuration.
pub struct Service {
    config: ServiceConfig,
    handlers: HashMap<String, Handler>,
}

impl Service {
    /// Create a service with an empty registry.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its routing key. Start-up only.
    pub fn register(&mut self, input_type: impl Into<String>, handler: Handler) {
        let input_type = input_type.into();
        info!(input_type = %input_type, "registered handler");
        self.handlers.insert(input_type, handler);
    }

    /// The shared configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Registered routing keys, for the landing page and logs.
    pub fn input_types(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Process one transport-neutral event. Shared by all three bindings.
    ///
    /// Order matters: the token check short-circuits before any body
    /// decoding, and an unknown routing key is rejected before decoding
    /// as well.
    #[instrument(skip(self, raw))]
    pub async fn handle_raw(&self, raw: RawEvent) -> ResponseInfo {
        let params = QueryParams::extract(&raw.query);

        if let Some(error) = self.check_token(params.token.as_deref()) {
            warn!(input_type = %params.input_type, "token rejected");
            return ResponseInfo::from_error(HookData::without_body(params), error);
        }

        let Some(handler) = self.handlers.get(&params.input_type) else {
            let error = ErrorInfo::new(
                404,
                format!("unknown inputType '{}'", params.input_type),
            );
            return ResponseInfo::from_error(HookData::without_body(params), error);
        };

        handler.handle(raw, params).await
    }

    /// Check a request token against the allow-list.
    ///
    /// No allow-list configured means the check is disabled (open by
    /// default). With an allow-list, a missing token and an unknown token
    /// are distinct failures so operators can tell misconfiguration from
    /// bad credentials.
    fn check_token(&self, token: Option<&str>) -> Option<ErrorInfo> {
        if !self.config.requires_token() {
            return None;
        }

        match token {
            None => Some(ErrorInfo::new(401, "token not found")),
            Some(token) if !self.config.token_allow_list.contains(token) => {
                Some(ErrorInfo::new(401, "token not valid"))
            }
            Some(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
