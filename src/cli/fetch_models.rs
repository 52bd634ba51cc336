// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::load_config;
use crate::engine::RqrrEngine;
use crate::models::{HttpModelFetcher, ModelInitializer};

/// Arguments for fetch-models command
#[derive(Args, Debug)]
pub struct FetchModelsArgs {
    /// Base address serving the model artifacts (overrides config)
    #[arg(long)]
    pub origin: Option<String>,

    /// TOML config file (defaults to QR_* environment variables)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Per-artifact fetch timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Fetch artifacts one after another
    #[arg(long)]
    pub sequential: bool,
}

pub async fn fetch_models(args: FetchModelsArgs) -> Result<()> {
    let config = load_config(
        args.config.as_deref(),
        args.origin.as_deref(),
        args.timeout_secs,
        args.sequential,
    )?;

    let engine = RqrrEngine::new();
    let fetcher = HttpModelFetcher::new(config.request_timeout())?;
    let initializer = ModelInitializer::new();

    let ready = initializer
        .get_or_init(&config, &fetcher, &engine)
        .await
        .context("Failed to fetch QR detector models")?;

    println!("✅ Models from {}", ready.origin());
    for artifact in ready.installed() {
        println!(
            "   {}{:<20} {:>10} bytes",
            ready.storage_root(),
            artifact.kind.file_name(),
            artifact.size_bytes
        );
    }
    println!("   total: {} bytes", ready.total_bytes());

    Ok(())
}
