// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::load_config;
use crate::decoder::{DecodeOutcome, QrDecoder, QrcodeDecoderAsync, SupportedFormat, TracingLogger};
use crate::engine::RqrrEngine;
use crate::models::HttpModelFetcher;

/// Arguments for scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Base address serving the model artifacts (overrides config)
    #[arg(long)]
    pub origin: Option<String>,

    /// TOML config file (defaults to QR_* environment variables)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Requested formats, comma-separated
    #[arg(long = "format", value_delimiter = ',', default_value = "QR_CODE")]
    pub formats: Vec<SupportedFormat>,

    /// Per-artifact fetch timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Fetch artifacts one after another
    #[arg(long)]
    pub sequential: bool,

    /// Log per-frame decoder messages
    #[arg(long)]
    pub verbose: bool,

    /// Image files to decode
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
}

/// Render one decode outcome as a JSON line
pub fn outcome_to_json(image: &str, outcome: &DecodeOutcome) -> Value {
    match outcome {
        DecodeOutcome::Found(result) => json!({
            "image": image,
            "status": "found",
            "result": result,
        }),
        DecodeOutcome::NotFound => json!({
            "image": image,
            "status": "not_found",
        }),
        DecodeOutcome::Failed(failure) => json!({
            "image": image,
            "status": "failed",
            "error": failure.to_string(),
        }),
    }
}

pub async fn scan(args: ScanArgs) -> Result<()> {
    let mut config = load_config(
        args.config.as_deref(),
        args.origin.as_deref(),
        args.timeout_secs,
        args.sequential,
    )?;
    config.verbose |= args.verbose;

    let engine = Arc::new(RqrrEngine::new());
    let fetcher = HttpModelFetcher::new(config.request_timeout())?;

    let ready = QrDecoder::init(&config, &fetcher, engine.as_ref())
        .await
        .context("Failed to initialize QR detector models")?;

    let mut decoder = QrDecoder::new(
        &ready,
        engine.clone(),
        &args.formats,
        config.verbose,
        Arc::new(TracingLogger),
    )
    .context("Model-backed QR decoder unavailable")?;

    info!("Scanning {} image(s) with {}", args.images.len(), decoder.name());

    let mut found = 0usize;
    for path in &args.images {
        let image_name = path.display().to_string();
        let line = match image::open(path) {
            Ok(frame) => {
                let outcome = decoder.decode_async(&frame).await;
                if outcome.is_found() {
                    found += 1;
                }
                outcome_to_json(&image_name, &outcome)
            }
            Err(e) => {
                warn!("Failed to open {}: {}", image_name, e);
                json!({
                    "image": image_name,
                    "status": "unreadable",
                    "error": e.to_string(),
                })
            }
        };
        println!("{}", line);
    }

    info!("Decoded {}/{} image(s)", found, args.images.len());
    Ok(())
}
