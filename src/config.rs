//! Gateway configuration.
//!
//! Resolved once at startup and immutable afterwards; request handling
//! only ever reads it through a shared reference.

use thiserror::Error;

/// Fireworks chat-completions endpoint the gateway fronts.
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://api.fireworks.ai/inference/v1/chat/completions";

/// Model pinned for both Chain-of-Draft stage calls.
pub const DRAFT_MODEL: &str = "accounts/fireworks/models/deepseek-v3p1";

/// Environment variable holding the upstream bearer credential.
pub const API_KEY_ENV: &str = "FIREWORKS_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid upstream URL '{0}': expected an http(s) URL")]
    InvalidUpstreamUrl(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Process-wide gateway settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,

    /// Full URL of the upstream chat-completions endpoint
    pub upstream_url: String,

    /// Bearer credential for the upstream provider. `None` keeps the
    /// server running but turns every request into a configuration error.
    pub api_key: Option<String>,

    pub request_timeout_secs: u64,
    pub verbose: bool,

    /// Directory for rolling log files; stdout only when unset
    pub log_dir: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            api_key: None,
            request_timeout_secs: 600,
            verbose: false,
            log_dir: None,
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.upstream_url.starts_with("http://")
            && !self.upstream_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidUpstreamUrl(self.upstream_url.clone()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
