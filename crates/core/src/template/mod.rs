//! Template registry: known templates and their declared parameters.

mod registry;

pub use registry::{ResolvedTemplate, TemplateError, TemplateRegistry};
