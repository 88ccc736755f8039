use super::{
    types::{AuthMethod, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Ticket secret is non-empty (missing secrets are fatal at startup)
/// - API key present when api_key auth is selected
/// - Server port is not 0
/// - Consumer concurrency is not 0
/// - Template declarations are well-formed
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.ticket.secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "ticket.secret must not be empty".to_string(),
        ));
    }

    if matches!(config.auth.method, AuthMethod::ApiKey)
        && config.auth.api_key.as_ref().is_none_or(|k| k.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key is required when auth.method = \"api_key\"".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.consumer.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "consumer.concurrency cannot be 0".to_string(),
        ));
    }

    for (name, template) in &config.templates {
        if template.script.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "templates.{}.script must not be empty",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn base_config() -> Config {
        load_config_from_str(
            r#"
[auth]
method = "none"

[ticket]
secret = "s"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_secret_fails() {
        let mut config = base_config();
        config.ticket.secret = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_api_key_method_without_key_fails() {
        let mut config = base_config();
        config.auth.method = AuthMethod::ApiKey;
        config.auth.api_key = None;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server.port = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = base_config();
        config.consumer.concurrency = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
