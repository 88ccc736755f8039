//! Error types for the renderer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering a document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Render script for the template not found.
    #[error("Render script not found: {path}")]
    ScriptNotFound { path: PathBuf },

    /// PDF command binary not found.
    #[error("PDF command not found: {path}")]
    PdfCommandNotFound { path: PathBuf },

    /// The render process exited with a failure.
    #[error("Render failed: {reason}")]
    RenderFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The render process exceeded its deadline.
    #[error("Render timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The process produced output that is not usable.
    #[error("Invalid render output: {reason}")]
    InvalidOutput { reason: String },

    /// I/O error while driving the render process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn render_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::RenderFailed {
            reason: reason.into(),
            stderr,
        }
    }

    pub fn invalid_output(reason: impl Into<String>) -> Self {
        Self::InvalidOutput {
            reason: reason.into(),
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Missing scripts and malformed output are deterministic; timeouts
    /// and I/O failures are worth another delivery.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}
