//! Injected logging capability
//!
//! The transformers only decide *what* to report. Where it goes is up to the
//! `Logger` they are handed.

use serde_json::Value;

/// Diagnostics sink with structured context
///
/// Both methods default to doing nothing, so an implementation only overrides
/// the levels it cares about. Logging must never change a transform's result.
pub trait Logger: Send + Sync {
    fn debug(&self, _context: &Value, _message: &str) {}

    fn warn(&self, _context: &Value, _message: &str) {}
}

/// Logger that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {}

/// Logger that forwards to the `tracing` macros
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, context: &Value, message: &str) {
        tracing::debug!(%context, "{}", message);
    }

    fn warn(&self, context: &Value, message: &str) {
        tracing::warn!(%context, "{}", message);
    }
}
