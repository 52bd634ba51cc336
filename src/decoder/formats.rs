// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Symbologies and requested-format validation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbologies a decoder strategy may be asked to recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupportedFormat {
    QrCode,
    Aztec,
    Codabar,
    #[serde(rename = "CODE_39")]
    Code39,
    #[serde(rename = "CODE_93")]
    Code93,
    #[serde(rename = "CODE_128")]
    Code128,
    DataMatrix,
    Maxicode,
    Itf,
    #[serde(rename = "EAN_13")]
    Ean13,
    #[serde(rename = "EAN_8")]
    Ean8,
    #[serde(rename = "PDF_417")]
    Pdf417,
    #[serde(rename = "RSS_14")]
    Rss14,
    RssExpanded,
    UpcA,
    UpcE,
    UpcEanExtension,
}

impl SupportedFormat {
    pub const ALL: [SupportedFormat; 17] = [
        SupportedFormat::QrCode,
        SupportedFormat::Aztec,
        SupportedFormat::Codabar,
        SupportedFormat::Code39,
        SupportedFormat::Code93,
        SupportedFormat::Code128,
        SupportedFormat::DataMatrix,
        SupportedFormat::Maxicode,
        SupportedFormat::Itf,
        SupportedFormat::Ean13,
        SupportedFormat::Ean8,
        SupportedFormat::Pdf417,
        SupportedFormat::Rss14,
        SupportedFormat::RssExpanded,
        SupportedFormat::UpcA,
        SupportedFormat::UpcE,
        SupportedFormat::UpcEanExtension,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SupportedFormat::QrCode => "QR_CODE",
            SupportedFormat::Aztec => "AZTEC",
            SupportedFormat::Codabar => "CODABAR",
            SupportedFormat::Code39 => "CODE_39",
            SupportedFormat::Code93 => "CODE_93",
            SupportedFormat::Code128 => "CODE_128",
            SupportedFormat::DataMatrix => "DATA_MATRIX",
            SupportedFormat::Maxicode => "MAXICODE",
            SupportedFormat::Itf => "ITF",
            SupportedFormat::Ean13 => "EAN_13",
            SupportedFormat::Ean8 => "EAN_8",
            SupportedFormat::Pdf417 => "PDF_417",
            SupportedFormat::Rss14 => "RSS_14",
            SupportedFormat::RssExpanded => "RSS_EXPANDED",
            SupportedFormat::UpcA => "UPC_A",
            SupportedFormat::UpcE => "UPC_E",
            SupportedFormat::UpcEanExtension => "UPC_EAN_EXTENSION",
        }
    }
}

impl fmt::Display for SupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown barcode format: {0}")]
pub struct ParseFormatError(pub String);

impl FromStr for SupportedFormat {
    type Err = ParseFormatError;

    /// Accepts names like `QR_CODE`, `qr_code` or `qr-code`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        SupportedFormat::ALL
            .iter()
            .copied()
            .find(|format| format.name() == normalized)
            .ok_or_else(|| ParseFormatError(s.to_string()))
    }
}

/// A requested symbology this strategy cannot serve
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{format} is not supported by the model-backed QR decoder")]
pub struct UnsupportedFormatError {
    pub format: SupportedFormat,
}

/// The one symbology this strategy supports
pub const QR_ONLY: SupportedFormat = SupportedFormat::QrCode;

/// Reject any requested format other than QR
///
/// Fails on the first offending format in request order.
pub fn validate_formats(requested: &[SupportedFormat]) -> Result<(), UnsupportedFormatError> {
    match requested.iter().find(|&&format| format != QR_ONLY) {
        Some(&format) => Err(UnsupportedFormatError { format }),
        None => Ok(()),
    }
}
