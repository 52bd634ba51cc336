// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model-backed QR decoder strategy
//!
//! Lifecycle:
//! 1. [`QrDecoder::init`] once per process (fetch + install model artifacts)
//! 2. [`QrDecoder::new`] per decoder (validate formats, build one detector)
//! 3. [`QrcodeDecoderAsync::decode_async`] once per frame
//!
//! Decoding never returns an error: engine failures (panics included) become
//! [`DecodeOutcome::Failed`] and a frame without a readable code becomes
//! [`DecodeOutcome::NotFound`].

pub mod formats;
pub mod logger;
pub mod result;

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;
use thiserror::Error;
use tracing::info;

pub use formats::{
    validate_formats, ParseFormatError, SupportedFormat, UnsupportedFormatError, QR_ONLY,
};
pub use logger::{Logger, TracingLogger};
pub use result::{DebugData, DecodeFailure, DecodeOutcome, QrcodeResult, QrcodeResultFormat};

use crate::config::DecoderConfig;
use crate::engine::{EngineError, QrDetector, VisionEngine};
use crate::models::{
    initialize, InitError, ModelSource, ModelsReady, DETECT_PROTO, DETECT_WEIGHTS, SR_PROTO,
    SR_WEIGHTS,
};

/// Name reported in [`DebugData`] for results produced by this strategy
pub const DECODER_NAME: &str = "opencv-js";

/// Decoder construction errors
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),

    #[error("Failed to build QR detector: {0}")]
    Detector(#[source] EngineError),
}

/// Uniform contract shared by all decoder strategies
///
/// Callers must not start a second decode on the same decoder while one is
/// outstanding; `&mut self` makes the scanning loop hold that guarantee.
#[async_trait]
pub trait QrcodeDecoderAsync: Send {
    /// Decode one frame
    async fn decode_async(&mut self, frame: &DynamicImage) -> DecodeOutcome;

    /// Strategy name for logging
    fn name(&self) -> &'static str;
}

/// QR decoder bound to one engine detector
pub struct QrDecoder<E: VisionEngine> {
    engine: Arc<E>,
    detector: E::Detector,
    verbose: bool,
    logger: Arc<dyn Logger>,
}

impl<E: VisionEngine> fmt::Debug for QrDecoder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QrDecoder")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl<E: VisionEngine> QrDecoder<E> {
    /// Fetch and install the model artifacts into `engine`
    ///
    /// Must complete before any decoder is constructed. Transport and
    /// install failures propagate.
    pub async fn init<S: ModelSource + ?Sized>(
        config: &DecoderConfig,
        source: &S,
        engine: &E,
    ) -> Result<ModelsReady, InitError> {
        initialize(config, source, engine).await
    }

    /// Validate `requested_formats` and build the detector
    ///
    /// No detector is built when validation fails.
    pub fn new(
        _ready: &ModelsReady,
        engine: Arc<E>,
        requested_formats: &[SupportedFormat],
        verbose: bool,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, ConstructionError> {
        validate_formats(requested_formats)?;

        let detector = engine
            .build_detector(DETECT_PROTO, DETECT_WEIGHTS, SR_PROTO, SR_WEIGHTS)
            .map_err(ConstructionError::Detector)?;

        info!("QR detector constructed");

        Ok(Self {
            engine,
            detector,
            verbose,
            logger,
        })
    }

    /// Decode one frame synchronously
    ///
    /// Runs the engine to completion; there is no cancellation point.
    pub fn decode(&mut self, frame: &DynamicImage) -> DecodeOutcome {
        let engine = &self.engine;
        let detector = &mut self.detector;

        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            let image = engine.read_grayscale_image(frame)?;
            let mut points = Vec::new();
            let texts = detector.detect_and_decode(&image, &mut points)?;
            Ok::<_, EngineError>((texts, points))
        }));

        let (texts, points) = match attempt {
            Ok(Ok(detected)) => detected,
            Ok(Err(e)) => return self.fail(DecodeFailure::Engine(e)),
            Err(payload) => return self.fail(DecodeFailure::Panicked(panic_message(payload))),
        };

        if self.verbose && texts.len() > 1 {
            self.logger.log(&format!(
                "{} candidates reported, using the first",
                texts.len()
            ));
        }

        // Only index 0 is considered; an empty string means undecodable
        match texts.into_iter().next() {
            Some(text) if !text.is_empty() => {
                if self.verbose {
                    if let Some(quad) = points.first() {
                        let center = quad.center();
                        self.logger.log(&format!(
                            "QR code located at ({:.1}, {:.1})",
                            center.x, center.y
                        ));
                    }
                }
                DecodeOutcome::Found(QrcodeResult {
                    text,
                    format: QrcodeResultFormat::create(QR_ONLY),
                    debug_data: DebugData {
                        decoder_name: DECODER_NAME.to_string(),
                    },
                })
            }
            _ => DecodeOutcome::NotFound,
        }
    }

    fn fail(&self, failure: DecodeFailure) -> DecodeOutcome {
        if self.verbose {
            match &failure {
                DecodeFailure::Panicked(_) => self.logger.log_error(&failure.to_string()),
                DecodeFailure::Engine(_) => self.logger.warn(&failure.to_string()),
            }
        }
        DecodeOutcome::Failed(failure)
    }
}

#[async_trait]
impl<E: VisionEngine> QrcodeDecoderAsync for QrDecoder<E> {
    async fn decode_async(&mut self, frame: &DynamicImage) -> DecodeOutcome {
        self.decode(frame)
    }

    fn name(&self) -> &'static str {
        DECODER_NAME
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
