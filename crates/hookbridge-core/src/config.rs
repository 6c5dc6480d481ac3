//! Service configuration.
//!
//! Built once at startup from the environment and passed by reference into
//! every request; never mutated afterward.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Immutable service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Port the HTTP binding listens on.
    pub port: u16,

    /// Base URL prepended to relative icon paths by normalizers.
    pub icon_base_url: String,

    /// Shared-token allow-list. Empty disables the token check entirely
    /// (open by default).
    pub token_allow_list: HashSet<String>,

    /// URL shown on the informational landing page.
    pub display_url: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            icon_base_url: String::new(),
            token_allow_list: HashSet::new(),
            display_url: None,
        }
    }
}

impl ServiceConfig {
    /// Parse a comma-separated token allow-list, trimming entries and
    /// dropping empties. An empty or whitespace-only input produces an
    /// empty set, which disables the token check.
    pub fn parse_token_allow_list(raw: &str) -> HashSet<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether the token check is active.
    pub fn requires_token(&self) -> bool {
        !self.token_allow_list.is_empty()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
