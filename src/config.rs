// src/config.rs
use std::time::Duration;

use crate::analysis::error::{ClassifyError, ClassifyResult};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Connection settings for the Gemini endpoint. Read once from the
/// environment at startup; CLI flags override individual fields.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ScanConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            endpoint: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            model: std::env::var("ECOSCAN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("ECOSCAN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }

    /// Apply CLI overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        api_key: Option<String>,
        endpoint: Option<String>,
        model: Option<String>,
    ) -> Self {
        if api_key.is_some() {
            self.api_key = api_key;
        }
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    /// The key is required for every call; its absence is a configuration
    /// error, never a silent failure.
    pub fn require_api_key(&self) -> ClassifyResult<&str> {
        self.api_key.as_deref().ok_or(ClassifyError::MissingApiKey)
    }
}
