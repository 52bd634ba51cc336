// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Test doubles for the vision engine, model origin and logger

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, RgbaImage};
use model_qr_decoder::{
    models::initialize, DecoderConfig, EngineError, Logger, ModelSource, ModelsReady, Point,
    QrDetector, Quad, StorageFlags, TransportError, VisionEngine,
};

pub const ORIGIN: &str = "https://models.example.com/wechat";

pub const ARTIFACT_NAMES: [&str; 4] = [
    "detect.prototxt",
    "detect.caffemodel",
    "sr.prototxt",
    "sr.caffemodel",
];

pub fn config() -> DecoderConfig {
    DecoderConfig::new(ORIGIN)
}

/// Run initialization against `engine` with a healthy origin
pub async fn ready(engine: &StubEngine) -> ModelsReady {
    initialize(&config(), &StubSource::new(), engine)
        .await
        .expect("initialization succeeds")
}

pub fn frame() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::new(32, 32))
}

/// What the stub engine does on the next decode
#[derive(Debug, Clone)]
pub enum Script {
    Candidates(Vec<String>),
    ReadError,
    DetectError,
    Panic,
}

impl Script {
    pub fn candidates(texts: &[&str]) -> Self {
        Script::Candidates(texts.iter().map(|t| t.to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub root: String,
    pub size_bytes: usize,
    pub flags: StorageFlags,
}

/// Scriptable engine with call counters
pub struct StubEngine {
    storage: Mutex<HashMap<String, StoredEntry>>,
    install_calls: AtomicUsize,
    build_calls: AtomicUsize,
    detect_calls: Arc<AtomicUsize>,
    script: Arc<Mutex<Script>>,
    failing_install: Option<&'static str>,
    reject_build: bool,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            storage: Mutex::new(HashMap::new()),
            install_calls: AtomicUsize::new(0),
            build_calls: AtomicUsize::new(0),
            detect_calls: Arc::new(AtomicUsize::new(0)),
            script: Arc::new(Mutex::new(Script::Candidates(Vec::new()))),
            failing_install: None,
            reject_build: false,
        }
    }

    pub fn failing_install(name: &'static str) -> Self {
        Self {
            failing_install: Some(name),
            ..Self::new()
        }
    }

    pub fn rejecting_build() -> Self {
        Self {
            reject_build: true,
            ..Self::new()
        }
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn install_calls(&self) -> usize {
        self.install_calls.load(Ordering::SeqCst)
    }

    pub fn build_calls(&self) -> usize {
        self.build_calls.load(Ordering::SeqCst)
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    pub fn entry(&self, name: &str) -> Option<StoredEntry> {
        self.storage.lock().unwrap().get(name).cloned()
    }

    pub fn entry_count(&self) -> usize {
        self.storage.lock().unwrap().len()
    }
}

impl VisionEngine for StubEngine {
    type Image = ();
    type Detector = StubDetector;

    fn read_grayscale_image(&self, _frame: &DynamicImage) -> Result<(), EngineError> {
        match *self.script.lock().unwrap() {
            Script::ReadError => Err(EngineError::ImageRead("unsupported surface".to_string())),
            _ => Ok(()),
        }
    }

    fn install_storage_entry(
        &self,
        root: &str,
        name: &str,
        bytes: &[u8],
        flags: StorageFlags,
    ) -> Result<(), EngineError> {
        self.install_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_install == Some(name) {
            return Err(EngineError::Storage {
                path: format!("{}{}", root, name),
                reason: "disk full".to_string(),
            });
        }

        self.storage.lock().unwrap().insert(
            name.to_string(),
            StoredEntry {
                root: root.to_string(),
                size_bytes: bytes.len(),
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
    ) -> Result<StubDetector, EngineError> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);

        if self.reject_build {
            return Err(EngineError::Construction("corrupt model".to_string()));
        }

        let storage = self.storage.lock().unwrap();
        for name in [detect_proto, detect_weights, sr_proto, sr_weights] {
            if !storage.contains_key(name) {
                return Err(EngineError::MissingEntry(name.to_string()));
            }
        }

        Ok(StubDetector {
            script: Arc::clone(&self.script),
            detect_calls: Arc::clone(&self.detect_calls),
        })
    }
}

pub struct StubDetector {
    script: Arc<Mutex<Script>>,
    detect_calls: Arc<AtomicUsize>,
}

impl QrDetector for StubDetector {
    type Image = ();

    fn detect_and_decode(
        &mut self,
        _image: &(),
        points: &mut Vec<Quad>,
    ) -> Result<Vec<String>, EngineError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);

        let script = self.script.lock().unwrap().clone();
        match script {
            Script::Candidates(texts) => {
                for (i, _) in texts.iter().enumerate() {
                    let offset = i as f32 * 10.0;
                    points.push(Quad {
                        corners: [
                            Point { x: offset, y: 0.0 },
                            Point { x: offset + 5.0, y: 0.0 },
                            Point { x: offset + 5.0, y: 5.0 },
                            Point { x: offset, y: 5.0 },
                        ],
                    });
                }
                Ok(texts)
            }
            Script::DetectError => Err(EngineError::Detection("network forward failed".to_string())),
            Script::Panic => panic!("engine fault"),
            Script::ReadError => unreachable!("read errors stop before detection"),
        }
    }
}

/// Model origin double serving fixed payloads
pub struct StubSource {
    failing: HashSet<&'static str>,
    requests: Mutex<Vec<(String, String)>>,
    fail_next_run: Mutex<bool>,
}

impl StubSource {
    pub fn new() -> Self {
        Self {
            failing: HashSet::new(),
            requests: Mutex::new(Vec::new()),
            fail_next_run: Mutex::new(false),
        }
    }

    pub fn failing_on(name: &'static str) -> Self {
        let mut source = Self::new();
        source.failing.insert(name);
        source
    }

    /// Refuse the first request, then serve normally
    pub fn flaky_once() -> Self {
        let source = Self::new();
        *source.fail_next_run.lock().unwrap() = true;
        source
    }

    pub fn payload(name: &str) -> Bytes {
        Bytes::from(format!("{}-payload", name))
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelSource for StubSource {
    async fn fetch(&self, base_address: &str, artifact_name: &str) -> Result<Bytes, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((base_address.to_string(), artifact_name.to_string()));

        let url = format!("{}/{}", base_address, artifact_name);

        {
            let mut fail_next = self.fail_next_run.lock().unwrap();
            if *fail_next {
                *fail_next = false;
                return Err(TransportError::Request {
                    url,
                    reason: "connection reset".to_string(),
                });
            }
        }

        if self.failing.contains(artifact_name) {
            return Err(TransportError::HttpStatus { status: 503, url });
        }

        // Yield so concurrent fetches interleave
        tokio::task::yield_now().await;
        Ok(Self::payload(artifact_name))
    }
}

/// Logger that records every message
#[derive(Default)]
pub struct RecordingLogger {
    pub messages: Mutex<Vec<(String, String)>>,
}

impl RecordingLogger {
    pub fn levels(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(level, _)| level.clone())
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("log".to_string(), message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("warn".to_string(), message.to_string()));
    }

    fn log_error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("error".to_string(), message.to_string()));
    }
}
