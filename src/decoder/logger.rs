// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Logger handed to decoders by the scanning loop

/// Sink for decoder diagnostics
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);

    fn warn(&self, message: &str);

    fn log_error(&self, message: &str);
}

/// Logger that forwards to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::debug!(target: "model_qr_decoder", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "model_qr_decoder", "{}", message);
    }

    fn log_error(&self, message: &str) {
        tracing::error!(target: "model_qr_decoder", "{}", message);
    }
}
