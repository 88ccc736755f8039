//! Trait definitions for the renderer module.

use async_trait::async_trait;

use super::error::RenderError;

/// Renders documents for registered templates.
///
/// Rendering is split in two stages so the HTML can travel through the
/// job queue as a claim-check payload: `render_html` runs at submission
/// time, `generate_pdf` runs later in the consumer.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Returns the name of this renderer implementation.
    fn name(&self) -> &str;

    /// Renders the template's HTML from its resolved parameters.
    ///
    /// `script` is the template's configured render script; `params`
    /// are name/value pairs in the template's declared order.
    async fn render_html(
        &self,
        script: &str,
        params: &[(String, String)],
    ) -> Result<String, RenderError>;

    /// Converts rendered HTML into PDF bytes.
    async fn generate_pdf(&self, template: &str, html: &str) -> Result<Vec<u8>, RenderError>;

    /// Validates that the renderer is properly configured and ready.
    async fn validate(&self) -> Result<(), RenderError>;
}
