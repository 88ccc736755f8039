//! Mock renderer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::renderer::{RenderError, Renderer};

/// A recorded render call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRender {
    pub script: String,
    pub params: Vec<(String, String)>,
}

/// Mock implementation of the Renderer trait.
///
/// Provides controllable behavior for testing:
/// - Track render calls for assertions
/// - Configure the HTML and PDF bytes returned
/// - Simulate failures on either stage
#[derive(Debug)]
pub struct MockRenderer {
    renders: Arc<RwLock<Vec<RecordedRender>>>,
    pdf_templates: Arc<RwLock<Vec<String>>>,
    html_output: Arc<RwLock<String>>,
    pdf_output: Arc<RwLock<Vec<u8>>>,
    fail_html: Arc<RwLock<bool>>,
    fail_pdf: Arc<RwLock<bool>>,
    fail_pdf_transient: Arc<RwLock<bool>>,
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            renders: Arc::new(RwLock::new(Vec::new())),
            pdf_templates: Arc::new(RwLock::new(Vec::new())),
            html_output: Arc::new(RwLock::new("<html>mock</html>".to_string())),
            pdf_output: Arc::new(RwLock::new(b"%PDF-mock".to_vec())),
            fail_html: Arc::new(RwLock::new(false)),
            fail_pdf: Arc::new(RwLock::new(false)),
            fail_pdf_transient: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded HTML render calls.
    pub async fn recorded_renders(&self) -> Vec<RecordedRender> {
        self.renders.read().await.clone()
    }

    /// Get the templates PDF generation was called for.
    pub async fn recorded_pdf_templates(&self) -> Vec<String> {
        self.pdf_templates.read().await.clone()
    }

    /// Set the HTML returned by `render_html`.
    pub async fn set_html_output(&self, html: impl Into<String>) {
        *self.html_output.write().await = html.into();
    }

    /// Set the bytes returned by `generate_pdf`.
    pub async fn set_pdf_output(&self, bytes: Vec<u8>) {
        *self.pdf_output.write().await = bytes;
    }

    /// Make `render_html` fail.
    pub async fn set_fail_html(&self, fail: bool) {
        *self.fail_html.write().await = fail;
    }

    /// Make `generate_pdf` fail.
    pub async fn set_fail_pdf(&self, fail: bool) {
        *self.fail_pdf.write().await = fail;
    }

    /// Make `generate_pdf` fail with a retryable I/O error.
    pub async fn set_fail_pdf_transient(&self, fail: bool) {
        *self.fail_pdf_transient.write().await = fail;
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn render_html(
        &self,
        script: &str,
        params: &[(String, String)],
    ) -> Result<String, RenderError> {
        if *self.fail_html.read().await {
            return Err(RenderError::render_failed("mock html failure", None));
        }
        self.renders.write().await.push(RecordedRender {
            script: script.to_string(),
            params: params.to_vec(),
        });
        Ok(self.html_output.read().await.clone())
    }

    async fn generate_pdf(&self, template: &str, _html: &str) -> Result<Vec<u8>, RenderError> {
        if *self.fail_pdf.read().await {
            return Err(RenderError::render_failed("mock pdf failure", None));
        }
        if *self.fail_pdf_transient.read().await {
            return Err(RenderError::Io(std::io::Error::other(
                "mock transient pdf failure",
            )));
        }
        self.pdf_templates.write().await.push(template.to_string());
        Ok(self.pdf_output.read().await.clone())
    }

    async fn validate(&self) -> Result<(), RenderError> {
        Ok(())
    }
}
