// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model artifact retrieval from the configured origin
//!
//! No caching and no retry: every initialization re-fetches.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Artifact retrieval errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("Invalid model address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Timeout fetching: {0}")]
    Timeout(String),

    #[error("HTTP error for {url}: {reason}")]
    Request { url: String, reason: String },

    #[error("HTTP {status} for: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read body of {url}: {reason}")]
    Body { url: String, reason: String },
}

/// Source of model artifacts
#[async_trait]
pub trait ModelSource: Send + Sync {
    /// Retrieve `artifact_name` from `base_address`, returning the full payload
    async fn fetch(&self, base_address: &str, artifact_name: &str) -> Result<Bytes, TransportError>;
}

/// Build the artifact URL as `base_address + "/" + artifact_name`
pub fn artifact_url(base_address: &str, artifact_name: &str) -> Result<Url, TransportError> {
    let address = format!("{}/{}", base_address, artifact_name);
    Url::parse(&address).map_err(|e| TransportError::InvalidAddress {
        address,
        reason: e.to_string(),
    })
}

/// HTTP GET artifact fetcher
#[derive(Debug, Clone)]
pub struct HttpModelFetcher {
    client: Client,
}

impl HttpModelFetcher {
    /// Create a fetcher whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                reason: e.to_string(),
            })?;

        Ok(Self { client })
    }

    /// Create a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelSource for HttpModelFetcher {
    async fn fetch(&self, base_address: &str, artifact_name: &str) -> Result<Bytes, TransportError> {
        let url = artifact_url(base_address, artifact_name)?;
        let url_str = url.to_string();

        debug!("Fetching model artifact from: {}", url_str);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(url_str.clone())
            } else {
                TransportError::Request {
                    url: url_str.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                url: url_str,
            });
        }

        let bytes = response.bytes().await.map_err(|e| TransportError::Body {
            url: url_str.clone(),
            reason: e.to_string(),
        })?;

        info!("Fetched {} bytes from: {}", bytes.len(), url_str);

        Ok(bytes)
    }
}
