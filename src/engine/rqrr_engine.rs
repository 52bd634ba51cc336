// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Production engine adapter backed by `rqrr`
//!
//! Keeps model artifacts in an in-memory virtual storage keyed by absolute
//! path. A detector can only be built once all four artifacts are present
//! and non-empty, so the provisioning lifecycle is the same as for engines
//! that execute the CNN weights. Detection itself runs through `rqrr`.

use std::collections::HashMap;
use std::sync::RwLock;

use image::{DynamicImage, GrayImage};
use tracing::debug;

use super::{EngineError, Point, QrDetector, Quad, StorageFlags, VisionEngine};

/// Working directory used to resolve relative artifact names
const CWD: &str = "/";

#[derive(Debug)]
struct StoredEntry {
    bytes: Vec<u8>,
    flags: StorageFlags,
}

/// `rqrr`-backed vision engine with in-memory storage
#[derive(Debug, Default)]
pub struct RqrrEngine {
    storage: RwLock<HashMap<String, StoredEntry>>,
}

/// Model artifact bound into a detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBinding {
    pub path: String,
    pub size_bytes: usize,
}

/// Detector handle produced by [`RqrrEngine`]
#[derive(Debug)]
pub struct RqrrDetector {
    bindings: Vec<ModelBinding>,
}

fn join_path(root: &str, name: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), name)
}

fn resolve(name: &str) -> String {
    if name.starts_with('/') {
        name.to_string()
    } else {
        join_path(CWD, name)
    }
}

impl RqrrEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an entry exists at `path` (relative paths resolve against `/`)
    pub fn has_entry(&self, path: &str) -> bool {
        self.storage
            .read()
            .map(|storage| storage.contains_key(&resolve(path)))
            .unwrap_or(false)
    }

    /// Size and flags of the entry at `path`
    pub fn entry_info(&self, path: &str) -> Option<(usize, StorageFlags)> {
        let storage = self.storage.read().ok()?;
        storage
            .get(&resolve(path))
            .map(|entry| (entry.bytes.len(), entry.flags))
    }

    fn bind(&self, name: &str) -> Result<ModelBinding, EngineError> {
        let path = resolve(name);
        let storage = self
            .storage
            .read()
            .map_err(|_| EngineError::Construction("storage lock poisoned".to_string()))?;

        let entry = storage
            .get(&path)
            .ok_or_else(|| EngineError::MissingEntry(path.clone()))?;

        if !entry.flags.can_read {
            return Err(EngineError::Construction(format!("{} is not readable", path)));
        }
        if entry.bytes.is_empty() {
            return Err(EngineError::Construction(format!("{} is empty", path)));
        }

        Ok(ModelBinding {
            path,
            size_bytes: entry.bytes.len(),
        })
    }
}

impl VisionEngine for RqrrEngine {
    type Image = GrayImage;
    type Detector = RqrrDetector;

    fn read_grayscale_image(&self, frame: &DynamicImage) -> Result<GrayImage, EngineError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(EngineError::ImageRead(format!(
                "frame has no pixels ({}x{})",
                frame.width(),
                frame.height()
            )));
        }
        Ok(frame.to_luma8())
    }

    fn install_storage_entry(
        &self,
        root: &str,
        name: &str,
        bytes: &[u8],
        flags: StorageFlags,
    ) -> Result<(), EngineError> {
        let path = join_path(root, name);

        if !root.starts_with('/') {
            return Err(EngineError::Storage {
                path,
                reason: "root must be absolute".to_string(),
            });
        }
        if name.is_empty() || name.contains('/') {
            return Err(EngineError::Storage {
                path,
                reason: "invalid entry name".to_string(),
            });
        }

        let mut storage = self.storage.write().map_err(|_| EngineError::Storage {
            path: path.clone(),
            reason: "storage lock poisoned".to_string(),
        })?;

        debug!("Installing {} ({} bytes)", path, bytes.len());
        storage.insert(
            path,
            StoredEntry {
                bytes: bytes.to_vec(),
                flags,
            },
        );
        Ok(())
    }

    fn build_detector(
        &self,
        detect_proto: &str,
        detect_weights: &str,
        sr_proto: &str,
        sr_weights: &str,
    ) -> Result<RqrrDetector, EngineError> {
        let bindings = [detect_proto, detect_weights, sr_proto, sr_weights]
            .iter()
            .map(|name| self.bind(name))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Detector bound to {} model files ({} bytes)",
            bindings.len(),
            bindings.iter().map(|b| b.size_bytes).sum::<usize>()
        );

        Ok(RqrrDetector { bindings })
    }
}

impl RqrrDetector {
    /// Model artifacts this detector was built from
    pub fn bindings(&self) -> &[ModelBinding] {
        &self.bindings
    }
}

impl QrDetector for RqrrDetector {
    type Image = GrayImage;

    fn detect_and_decode(
        &mut self,
        image: &GrayImage,
        points: &mut Vec<Quad>,
    ) -> Result<Vec<String>, EngineError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EngineError::Detection("empty image".to_string()));
        }

        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                image.get_pixel(x as u32, y as u32).0[0]
            });

        let grids = prepared.detect_grids();
        let mut texts = Vec::with_capacity(grids.len());

        for grid in grids {
            let corner = |i: usize| Point {
                x: grid.bounds[i].x as f32,
                y: grid.bounds[i].y as f32,
            };
            points.push(Quad {
                corners: [corner(0), corner(1), corner(2), corner(3)],
            });

            // Localized but undecodable codes are reported as empty strings
            match grid.decode() {
                Ok((_, content)) => texts.push(content),
                Err(e) => {
                    debug!("Grid localized but not decoded: {}", e);
                    texts.push(String::new());
                }
            }
        }

        Ok(texts)
    }
}
