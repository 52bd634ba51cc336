// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for model provisioning and decoding

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Model origin is not set")]
    MissingOrigin,

    #[error("Invalid model origin {origin}: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("Request timeout must be greater than 0")]
    ZeroTimeout,

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Decoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Base address serving the four model artifacts
    pub model_origin: String,
    /// Per-artifact request timeout in seconds
    pub request_timeout_secs: u64,
    /// Fetch the four artifacts concurrently instead of one after another
    pub concurrent_fetch: bool,
    /// Emit per-frame decode messages
    pub verbose: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            model_origin: String::new(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrent_fetch: true,
            verbose: false,
        }
    }
}

impl DecoderConfig {
    /// Configuration pointing at `model_origin`, defaults elsewhere
    pub fn new(model_origin: impl Into<String>) -> Self {
        Self {
            model_origin: model_origin.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        Self {
            model_origin: env::var("QR_MODEL_ORIGIN").unwrap_or(defaults.model_origin),
            request_timeout_secs: env::var("QR_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            concurrent_fetch: env::var("QR_CONCURRENT_FETCH")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(defaults.concurrent_fetch),
            verbose: env::var("QR_VERBOSE")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(defaults.verbose),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_origin.is_empty() {
            return Err(ConfigError::MissingOrigin);
        }

        let parsed = Url::parse(&self.model_origin).map_err(|e| ConfigError::InvalidOrigin {
            origin: self.model_origin.clone(),
            reason: e.to_string(),
        })?;

        if !["http", "https"].contains(&parsed.scheme()) {
            return Err(ConfigError::InvalidOrigin {
                origin: self.model_origin.clone(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }
}
