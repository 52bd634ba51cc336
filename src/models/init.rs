// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! One-time model initialization phase
//!
//! Fetches the four artifacts and installs them into engine storage. The
//! only way to obtain a [`ModelsReady`] token is a fully successful run, and
//! decoder construction takes that token, so "models installed before any
//! detector is built" is a data dependency rather than a global flag.

use futures::future::try_join_all;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::fetcher::{ModelSource, TransportError};
use super::installer::{install, InstallError, STORAGE_ROOT};
use super::{ArtifactKind, ModelArtifact};
use crate::config::{ConfigError, DecoderConfig};
use crate::engine::VisionEngine;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {artifact}: {source}")]
    Transport {
        artifact: &'static str,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Install(#[from] InstallError),
}

/// An artifact present in engine storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArtifact {
    pub kind: ArtifactKind,
    pub size_bytes: usize,
}

/// Proof that all four artifacts are fetched and installed
#[derive(Debug, Clone)]
pub struct ModelsReady {
    origin: String,
    root: &'static str,
    installed: Vec<InstalledArtifact>,
}

impl ModelsReady {
    /// Origin the artifacts were fetched from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Storage root the artifacts were installed under
    pub fn storage_root(&self) -> &str {
        self.root
    }

    /// Installed artifacts in detector argument order
    pub fn installed(&self) -> &[InstalledArtifact] {
        &self.installed
    }

    /// Sum of installed artifact sizes
    pub fn total_bytes(&self) -> usize {
        self.installed.iter().map(|a| a.size_bytes).sum()
    }
}

async fn fetch_artifact<S: ModelSource + ?Sized>(
    source: &S,
    origin: &str,
    kind: ArtifactKind,
) -> Result<ModelArtifact, InitError> {
    let bytes = source
        .fetch(origin, kind.file_name())
        .await
        .map_err(|source| InitError::Transport {
            artifact: kind.file_name(),
            source,
        })?;

    debug!("Fetched {} ({} bytes)", kind, bytes.len());
    Ok(ModelArtifact { kind, bytes })
}

/// Run the initialization phase
///
/// Fetch failures abort before anything is installed. Nothing is cached
/// between runs; calling this again re-fetches and overwrites the same four
/// entries. Use [`ModelInitializer`] to run it once per process.
pub async fn initialize<S, E>(
    config: &DecoderConfig,
    source: &S,
    engine: &E,
) -> Result<ModelsReady, InitError>
where
    S: ModelSource + ?Sized,
    E: VisionEngine + ?Sized,
{
    config.validate()?;
    let origin = config.model_origin.as_str();

    info!("Fetching QR detector models from {}", origin);

    let artifacts = if config.concurrent_fetch {
        try_join_all(
            ArtifactKind::ALL
                .iter()
                .map(|&kind| fetch_artifact(source, origin, kind)),
        )
        .await?
    } else {
        let mut artifacts = Vec::with_capacity(ArtifactKind::ALL.len());
        for kind in ArtifactKind::ALL {
            artifacts.push(fetch_artifact(source, origin, kind).await?);
        }
        artifacts
    };

    let mut installed = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        install(engine, STORAGE_ROOT, artifact.name(), &artifact.bytes)?;
        installed.push(InstalledArtifact {
            kind: artifact.kind,
            size_bytes: artifact.size_bytes(),
        });
    }

    let ready = ModelsReady {
        origin: origin.to_string(),
        root: STORAGE_ROOT,
        installed,
    };

    info!(
        "✅ QR detector models installed ({} files, {} bytes)",
        ready.installed.len(),
        ready.total_bytes()
    );

    Ok(ready)
}

/// Process-wide guard around [`initialize`]
///
/// Concurrent callers share one run. A successful run is kept for the life
/// of the initializer; a failed run is not, so the next caller retries.
#[derive(Debug, Default)]
pub struct ModelInitializer {
    cell: OnceCell<ModelsReady>,
}

impl ModelInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the readiness token, running initialization if needed
    pub async fn get_or_init<S, E>(
        &self,
        config: &DecoderConfig,
        source: &S,
        engine: &E,
    ) -> Result<&ModelsReady, InitError>
    where
        S: ModelSource + ?Sized,
        E: VisionEngine + ?Sized,
    {
        self.cell
            .get_or_try_init(|| initialize(config, source, engine))
            .await
    }

    /// The readiness token, if initialization already succeeded
    pub fn get(&self) -> Option<&ModelsReady> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
