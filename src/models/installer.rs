// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Engine storage installation of fetched artifacts

use thiserror::Error;
use tracing::debug;

use crate::engine::{EngineError, StorageFlags, VisionEngine};

/// Fixed storage root for model artifacts
pub const STORAGE_ROOT: &str = "/";

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Failed to install {name} under {path}: {source}")]
pub struct InstallError {
    pub path: String,
    pub name: String,
    #[source]
    pub source: EngineError,
}

/// Write one artifact into engine storage as a data file
///
/// Writing the same name twice replaces the entry.
pub fn install<E: VisionEngine + ?Sized>(
    engine: &E,
    path: &str,
    name: &str,
    bytes: &[u8],
) -> Result<(), InstallError> {
    debug!("Installing {} ({} bytes) under {}", name, bytes.len(), path);

    engine
        .install_storage_entry(path, name, bytes, StorageFlags::DATA_FILE)
        .map_err(|source| InstallError {
            path: path.to_string(),
            name: name.to_string(),
            source,
        })
}
