//! Document rendering: template scripts to HTML, HTML to PDF.

mod command;
mod error;
mod traits;

pub use command::CommandRenderer;
pub use error::RenderError;
pub use traits::Renderer;
