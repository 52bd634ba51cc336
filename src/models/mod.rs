// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model artifact provisioning
//!
//! The detector needs four binary artifacts (a proto/weight pair for
//! detection and one for super-resolution). They are fetched from the
//! configured model origin and written into engine storage once per
//! process, before any decoder is constructed.
//!
//! Components:
//! - `fetcher` - Retrieves artifacts from the model origin
//! - `installer` - Writes artifacts into engine storage
//! - `init` - One-time initialization phase and its readiness token

pub mod fetcher;
pub mod init;
pub mod installer;

use std::fmt;

use bytes::Bytes;

pub use fetcher::{artifact_url, HttpModelFetcher, ModelSource, TransportError};
pub use init::{initialize, InitError, InstalledArtifact, ModelInitializer, ModelsReady};
pub use installer::{install, InstallError, STORAGE_ROOT};

/// Detection network definition
pub const DETECT_PROTO: &str = "detect.prototxt";

/// Detection network weights
pub const DETECT_WEIGHTS: &str = "detect.caffemodel";

/// Super-resolution network definition
pub const SR_PROTO: &str = "sr.prototxt";

/// Super-resolution network weights
pub const SR_WEIGHTS: &str = "sr.caffemodel";

/// The four well-known model artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    DetectProto,
    DetectWeights,
    SrProto,
    SrWeights,
}

impl ArtifactKind {
    /// All artifacts, in detector argument order
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::DetectProto,
        ArtifactKind::DetectWeights,
        ArtifactKind::SrProto,
        ArtifactKind::SrWeights,
    ];

    /// Fixed file name, shared by the model origin and engine storage
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::DetectProto => DETECT_PROTO,
            ArtifactKind::DetectWeights => DETECT_WEIGHTS,
            ArtifactKind::SrProto => SR_PROTO,
            ArtifactKind::SrWeights => SR_WEIGHTS,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A fetched model artifact
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub kind: ArtifactKind,
    pub bytes: Bytes,
}

impl ModelArtifact {
    pub fn name(&self) -> &'static str {
        self.kind.file_name()
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}
