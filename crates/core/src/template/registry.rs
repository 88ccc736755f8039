//! Template lookup and required-parameter validation.

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::config::TemplateConfig;

/// Error type for template resolution.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template is not registered.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// One or more declared required parameters are absent.
    /// Carries every missing name, not just the first.
    #[error("Missing required parameters: {}", .0.join(","))]
    MissingParameters(Vec<String>),
}

/// A template resolved against a caller's parameter map.
///
/// `required_params` holds `(name, value)` pairs in the template's declared
/// order; this ordering feeds the dedup key and must never follow the
/// caller-supplied order.
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub name: String,
    pub script: String,
    pub required_params: Vec<(String, String)>,
}

impl ResolvedTemplate {
    /// Default artifact file name for this template.
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.name)
    }
}

/// Registry of renderable templates.
pub struct TemplateRegistry {
    templates: BTreeMap<String, TemplateConfig>,
}

impl TemplateRegistry {
    pub fn new(templates: BTreeMap<String, TemplateConfig>) -> Self {
        Self { templates }
    }

    /// Look up a template and validate the caller's parameters against its
    /// declared required list.
    pub fn resolve(
        &self,
        name: &str,
        params: &HashMap<String, String>,
    ) -> Result<ResolvedTemplate, TemplateError> {
        let entry = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))?;

        let missing: Vec<String> = entry
            .params
            .iter()
            .filter(|p| params.get(p.as_str()).is_none_or(|v| v.is_empty()))
            .cloned()
            .collect();

        if !missing.is_empty() {
            return Err(TemplateError::MissingParameters(missing));
        }

        let required_params = entry
            .params
            .iter()
            .map(|p| (p.clone(), params[p.as_str()].clone()))
            .collect();

        Ok(ResolvedTemplate {
            name: name.to_string(),
            script: entry.script.clone(),
            required_params,
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TemplateRegistry {
        let mut templates = BTreeMap::new();
        templates.insert(
            "crm-trade-invoice".to_string(),
            TemplateConfig {
                script: "crm-trade-invoice.py".to_string(),
                params: vec!["tradeid".to_string()],
            },
        );
        templates.insert(
            "product-de".to_string(),
            TemplateConfig {
                script: "product-de.py".to_string(),
                params: vec!["isin".to_string(), "date".to_string()],
            },
        );
        TemplateRegistry::new(templates)
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_known_template() {
        let resolved = registry()
            .resolve("crm-trade-invoice", &params(&[("tradeid", "123")]))
            .unwrap();
        assert_eq!(resolved.name, "crm-trade-invoice");
        assert_eq!(resolved.script, "crm-trade-invoice.py");
        assert_eq!(
            resolved.required_params,
            vec![("tradeid".to_string(), "123".to_string())]
        );
        assert_eq!(resolved.file_name(), "crm-trade-invoice.pdf");
    }

    #[test]
    fn test_resolve_unknown_template() {
        let result = registry().resolve("nope", &params(&[]));
        assert!(matches!(result, Err(TemplateError::UnknownTemplate(_))));
    }

    #[test]
    fn test_missing_params_lists_all_names() {
        let result = registry().resolve("product-de", &params(&[]));
        match result {
            Err(TemplateError::MissingParameters(missing)) => {
                assert_eq!(missing, vec!["isin".to_string(), "date".to_string()]);
            }
            other => panic!("expected MissingParameters, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let result = registry().resolve("product-de", &params(&[("isin", ""), ("date", "2024-01-01")]));
        match result {
            Err(TemplateError::MissingParameters(missing)) => {
                assert_eq!(missing, vec!["isin".to_string()]);
            }
            other => panic!("expected MissingParameters, got {:?}", other),
        }
    }

    #[test]
    fn test_declared_order_ignores_caller_order() {
        // Caller supplies date before isin; resolution keeps declared order.
        let resolved = registry()
            .resolve("product-de", &params(&[("date", "2024-01-01"), ("isin", "DE0001")]))
            .unwrap();
        assert_eq!(
            resolved.required_params,
            vec![
                ("isin".to_string(), "DE0001".to_string()),
                ("date".to_string(), "2024-01-01".to_string()),
            ]
        );
    }

    #[test]
    fn test_extra_params_are_tolerated() {
        let resolved = registry()
            .resolve(
                "crm-trade-invoice",
                &params(&[("tradeid", "123"), ("imageUrl", "https://x/y.svg")]),
            )
            .unwrap();
        assert_eq!(resolved.required_params.len(), 1);
    }
}
