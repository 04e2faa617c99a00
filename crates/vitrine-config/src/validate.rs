//! Post-merge configuration validation.

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];
const LOG_TARGETS: &[&str] = &["stdout", "stderr", "file"];

/// Maximum allowed request timeout (one hour).
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_activation(config)?;
    validate_filters(config)?;
    validate_http(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn attribute_name(field: &str, value: &str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid(field, format!("'{value}' must not contain whitespace")));
    }
    Ok(())
}

fn validate_activation(config: &Config) -> ConfigResult<()> {
    attribute_name("activation.module_attribute", &config.activation.module_attribute)?;
    attribute_name("activation.option_prefix", &config.activation.option_prefix)
}

fn validate_filters(config: &Config) -> ConfigResult<()> {
    let param = &config.filters.param;
    if param.is_empty() || param.contains(['&', '=', '#']) {
        return Err(invalid(
            "filters.param",
            format!("'{param}' is not a usable query parameter name"),
        ));
    }
    Ok(())
}

fn validate_http(config: &Config) -> ConfigResult<()> {
    let http = &config.http;

    if http.timeout_secs == 0 || http.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(invalid(
            "http.timeout_secs",
            format!("timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}"),
        ));
    }

    if let Some(base_url) = &http.base_url {
        let parsed = Url::parse(base_url)
            .map_err(|e| invalid("http.base_url", format!("'{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(
                "http.base_url",
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
    }

    attribute_name("http.csrf_header", &http.csrf_header)
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !LOG_LEVELS.contains(&l.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!("unknown level '{}'; expected one of: {}", l.level, LOG_LEVELS.join(", ")),
        ));
    }
    if !LOG_FORMATS.contains(&l.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!("unknown format '{}'; expected one of: {}", l.format, LOG_FORMATS.join(", ")),
        ));
    }
    if !LOG_TARGETS.contains(&l.target.as_str()) {
        return Err(invalid(
            "logging.target",
            format!("unknown target '{}'; expected one of: {}", l.target, LOG_TARGETS.join(", ")),
        ));
    }
    if l.target == "file" && l.directory.is_none() {
        return Err(invalid("logging.directory", "required when target is \"file\""));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_attribute_names() {
        let mut config = Config::default();
        config.activation.module_attribute = "data module".to_owned();
        assert_eq!(field_of(validate(&config)), "activation.module_attribute");

        let mut config = Config::default();
        config.activation.option_prefix = String::new();
        assert_eq!(field_of(validate(&config)), "activation.option_prefix");
    }

    #[test]
    fn test_filter_param() {
        let mut config = Config::default();
        config.filters.param = "a=b".to_owned();
        assert_eq!(field_of(validate(&config)), "filters.param");
    }

    #[test]
    fn test_http() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert_eq!(field_of(validate(&config)), "http.timeout_secs");

        let mut config = Config::default();
        config.http.base_url = Some("not a url".to_owned());
        assert_eq!(field_of(validate(&config)), "http.base_url");

        config.http.base_url = Some("ftp://catalog.example.org".to_owned());
        assert_eq!(field_of(validate(&config)), "http.base_url");

        config.http.base_url = Some("https://catalog.example.org/api/".to_owned());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_logging() {
        let mut config = Config::default();
        config.logging.level = "loud".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");

        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");

        let mut config = Config::default();
        config.logging.target = "file".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.directory");
        config.logging.directory = Some("/var/log/vitrine".to_owned());
        assert!(validate(&config).is_ok());
    }
}
