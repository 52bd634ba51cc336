// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision engine boundary
//!
//! The decoder never talks to a concrete detection library. It depends on
//! the [`VisionEngine`] capability, which exposes:
//! - grayscale image reading from a caller-supplied frame
//! - writes into the engine's private virtual storage
//! - detector construction from four installed model artifacts
//! - detect-and-decode on the constructed detector ([`QrDetector`])
//!
//! Production wires [`RqrrEngine`]; tests wire stubs.

pub mod rqrr_engine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use rqrr_engine::{RqrrDetector, RqrrEngine};

/// Errors raised by a vision engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Storage write failed for {path}: {reason}")]
    Storage { path: String, reason: String },

    #[error("Storage entry not found: {0}")]
    MissingEntry(String),

    #[error("Failed to read image: {0}")]
    ImageRead(String),

    #[error("Detector construction failed: {0}")]
    Construction(String),

    #[error("Detection failed: {0}")]
    Detection(String),
}

/// Flags attached to a virtual storage entry
///
/// Mirrors the data-file convention of script-hosted engines: the entry is
/// readable, not writable through the engine, and not owned by the caller.
/// Entries are stored as plain bytes, never lazily backed by a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageFlags {
    pub can_read: bool,
    pub can_write: bool,
    pub can_own: bool,
}

impl StorageFlags {
    /// Flags used for model artifacts
    pub const DATA_FILE: StorageFlags = StorageFlags {
        can_read: true,
        can_write: false,
        can_own: false,
    };
}

/// A 2D point in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Localization of one detected code (four corners, clockwise from top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    /// Centre of the four corners
    pub fn center(&self) -> Point {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point {
            x: sx / 4.0,
            y: sy / 4.0,
        }
    }
}

/// Stateful detector handle bound to installed model artifacts
///
/// A handle is a single mutable resource with no internal serialization,
/// hence `&mut self`.
pub trait QrDetector: Send {
    /// Engine-native image type accepted by this detector
    type Image;

    /// Find and decode codes in `image`
    ///
    /// Returns zero or more decoded strings in engine order. One localization
    /// quad is pushed into `points` per returned string. A string may be
    /// empty when a code was localized but could not be decoded.
    fn detect_and_decode(
        &mut self,
        image: &Self::Image,
        points: &mut Vec<Quad>,
    ) -> Result<Vec<String>, EngineError>;
}

/// Capability interface over an opaque vision engine
pub trait VisionEngine: Send + Sync {
    /// Single-channel engine-native image
    type Image;

    /// Detector produced by [`VisionEngine::build_detector`]
    type Detector: QrDetector<Image = Self::Image>;

    /// Convert a caller frame to a grayscale engine image
    fn read_grayscale_image(&self, frame: &DynamicImage) -> Result<Self::Image, EngineError>;

    /// Write `bytes` to `root`/`name` in engine storage, replacing any
    /// existing entry of the same name
    fn install_storage_entry(
        &self,
        root: &str,
        name: &str,
        bytes: &[u8],
        flags: StorageFlags,
    ) -> Result<(), EngineError>;

    /// Construct a detector from installed artifact names
    fn build_detector(
        &self,
        detect_proto: &str,
        detect_weights: &str,
        sr_proto: &str,
        sr_weights: &str,
    ) -> Result<Self::Detector, EngineError>;
}
