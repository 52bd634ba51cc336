// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decode results and outcomes

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::formats::SupportedFormat;
use crate::engine::EngineError;

/// Format of a decoded code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrcodeResultFormat {
    pub format: SupportedFormat,
    pub format_name: String,
}

impl QrcodeResultFormat {
    pub fn create(format: SupportedFormat) -> Self {
        Self {
            format,
            format_name: format.name().to_string(),
        }
    }
}

/// Provenance of a successful decode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugData {
    pub decoder_name: String,
}

/// A decoded code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrcodeResult {
    pub text: String,
    pub format: QrcodeResultFormat,
    pub debug_data: DebugData,
}

/// Engine failure while processing one frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeFailure {
    #[error("Engine error during decode: {0}")]
    Engine(#[from] EngineError),

    #[error("Engine panicked during decode: {0}")]
    Panicked(String),
}

/// Result of one decode attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Found(QrcodeResult),
    /// No code visible in this frame; the normal steady state
    NotFound,
    Failed(DecodeFailure),
}

impl DecodeOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, DecodeOutcome::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DecodeOutcome::NotFound)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DecodeOutcome::Failed(_))
    }

    /// The decoded result, if any
    pub fn found(&self) -> Option<&QrcodeResult> {
        match self {
            DecodeOutcome::Found(result) => Some(result),
            _ => None,
        }
    }

    pub fn into_result(self) -> Option<QrcodeResult> {
        match self {
            DecodeOutcome::Found(result) => Some(result),
            _ => None,
        }
    }
}
