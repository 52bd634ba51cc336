// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod models;
pub mod version;

// Re-export main types
pub use config::{ConfigError, DecoderConfig};
pub use decoder::{
    ConstructionError, DebugData, DecodeFailure, DecodeOutcome, Logger, QrDecoder,
    QrcodeDecoderAsync, QrcodeResult, QrcodeResultFormat, SupportedFormat, TracingLogger,
    UnsupportedFormatError, DECODER_NAME,
};
pub use engine::{EngineError, Point, QrDetector, Quad, RqrrEngine, StorageFlags, VisionEngine};
pub use models::{
    ArtifactKind, HttpModelFetcher, InitError, InstallError, ModelArtifact, ModelInitializer,
    ModelSource, ModelsReady, TransportError, STORAGE_ROOT,
};
