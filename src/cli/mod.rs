// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod fetch_models;
pub mod scan;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::DecoderConfig;

/// Model-backed QR decoder CLI
#[derive(Parser, Debug)]
#[command(name = "qr-decode")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Decode QR codes from images with a model-backed detector", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize models and decode QR codes from image files
    Scan(scan::ScanArgs),

    /// Fetch and install the model artifacts, then report them
    FetchModels(fetch_models::FetchModelsArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scan(args) => scan::scan(args).await,
        Commands::FetchModels(args) => fetch_models::fetch_models(args).await,
    }
}

/// Build the decoder configuration from an optional TOML file (or the
/// environment) plus command-line overrides
pub fn load_config(
    config_path: Option<&Path>,
    origin: Option<&str>,
    timeout_secs: Option<u64>,
    sequential: bool,
) -> Result<DecoderConfig> {
    let mut config = match config_path {
        Some(path) => DecoderConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DecoderConfig::from_env(),
    };

    if let Some(origin) = origin {
        config.model_origin = origin.to_string();
    }
    if let Some(timeout_secs) = timeout_secs {
        config.request_timeout_secs = timeout_secs;
    }
    if sequential {
        config.concurrent_fetch = false;
    }

    config.validate().context("Invalid decoder configuration")?;
    Ok(config)
}
