//! User-facing log sink
//!
//! Agents report progress and failures through a [`LogSink`] so the host
//! decides how to present them (console colours, a GUI panel, plain logs).
//! Internal detail goes straight to `tracing`.

use tracing::{error, info, warn};

/// Severity-tagged messages meant for the person running the client.
pub trait LogSink: Send + Sync {
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn success(&self, message: &str);
    fn info(&self, message: &str);
}

/// Forwards every message to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn error(&self, message: &str) {
        error!("{}", message);
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    fn success(&self, message: &str) {
        info!(outcome = "success", "{}", message);
    }

    fn info(&self, message: &str) {
        info!("{}", message);
    }
}
