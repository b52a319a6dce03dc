//! Error sink for failed API calls

use serde_json::Value;

/// Receives one record per failed call
///
/// `context` is a JSON object carrying at least `method`, plus the decoded
/// response or its headers when they explain the failure.
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, message: &str, context: &Value);
}

/// Forwards records to `tracing` at error level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn log_error(&self, message: &str, context: &Value) {
        tracing::error!(context = %context, "{}", message);
    }
}
