//! Bridge from `vitrine_config::Config` to domain types.
//!
//! The config crate has no dependencies on other vitrine crates; every
//! conversion into activator settings, catalogs, transports and log
//! configuration happens here, once.

use std::path::Path;
use std::time::Duration;

use tracing::info;
use vitrine_config::Config;
use vitrine_i18n::Catalog;
use vitrine_modules::ActivationSettings;
use vitrine_sandbox::HttpTransport;
use vitrine_telemetry::LogConfig;

use crate::error::RuntimeResult;

/// Convert the `[activation]` section.
#[must_use]
pub fn to_activation_settings(cfg: &Config) -> ActivationSettings {
    ActivationSettings {
        module_attribute: cfg.activation.module_attribute.clone(),
        option_prefix: cfg.activation.option_prefix.clone(),
    }
}

/// Build the translation catalog from the `[i18n]` section, loading
/// `catalog_path` when set.
///
/// # Errors
///
/// Returns [`RuntimeError::I18n`](crate::RuntimeError::I18n) if the catalog
/// file cannot be read or parsed.
pub fn to_catalog(cfg: &Config) -> RuntimeResult<Catalog> {
    let catalog = Catalog::with_locale(&cfg.i18n.locale, &cfg.i18n.domain);
    if let Some(path) = &cfg.i18n.catalog_path {
        catalog.load_file(Path::new(path))?;
        info!(path = %path, "loaded translation catalog");
    }
    Ok(catalog)
}

/// Build the AJAX transport from the `[http]` section.
///
/// The CSRF token, when configured, is sent on every request under
/// `csrf_header`.
///
/// # Errors
///
/// Returns [`RuntimeError::Sandbox`](crate::RuntimeError::Sandbox) if the
/// HTTP client cannot be built or `base_url` does not parse.
pub fn to_transport(cfg: &Config) -> RuntimeResult<HttpTransport> {
    let http = &cfg.http;
    let mut transport = HttpTransport::new(Duration::from_secs(http.timeout_secs))?;
    if let Some(base_url) = &http.base_url {
        transport = transport.with_base_url(base_url)?;
    }
    if let Some(token) = &http.csrf_token {
        transport = transport.with_default_header(&http.csrf_header, token);
    }
    Ok(transport)
}

/// Convert the `[logging]` section.
///
/// # Errors
///
/// Returns [`RuntimeError::Telemetry`](crate::RuntimeError::Telemetry) for an
/// unknown format or target.
pub fn to_log_config(cfg: &Config) -> RuntimeResult<LogConfig> {
    Ok(LogConfig::try_from(&cfg.logging)?)
}

/// Install the global `tracing` subscriber described by `[logging]`.
///
/// # Errors
///
/// Returns [`RuntimeError::Telemetry`](crate::RuntimeError::Telemetry) if the
/// section is invalid or a subscriber is already installed.
pub fn setup_logging(cfg: &Config) -> RuntimeResult<()> {
    vitrine_telemetry::setup_logging(&to_log_config(cfg)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_telemetry::{LogFormat, LogTarget};

    use crate::RuntimeError;

    #[test]
    fn test_activation_settings() {
        let mut cfg = Config::default();
        cfg.activation.module_attribute = "data-widget".to_owned();
        let settings = to_activation_settings(&cfg);
        assert_eq!(settings.module_attribute, "data-widget");
        assert_eq!(settings.option_prefix, "data-module");
    }

    #[test]
    fn test_catalog_without_file() {
        let mut cfg = Config::default();
        cfg.i18n.locale = "pt_BR".to_owned();
        let catalog = to_catalog(&cfg).unwrap();
        assert_eq!(catalog.locale().as_deref(), Some("pt_BR"));
        assert_eq!(catalog.translate("Remove", &[]), "Remove");
    }

    #[test]
    fn test_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pt_BR.json");
        std::fs::write(
            &path,
            r#"{"locale_data": {"vitrine": {"Remove": [null, "Remover"]}}}"#,
        )
        .unwrap();

        let mut cfg = Config::default();
        cfg.i18n.catalog_path = Some(path.display().to_string());
        let catalog = to_catalog(&cfg).unwrap();
        assert_eq!(catalog.translate("Remove", &[]), "Remover");
    }

    #[test]
    fn test_missing_catalog_file() {
        let mut cfg = Config::default();
        cfg.i18n.catalog_path = Some("/nonexistent/vitrine/catalog.json".to_owned());
        assert!(matches!(to_catalog(&cfg), Err(RuntimeError::I18n(_))));
    }

    #[test]
    fn test_transport_resolves_against_base_url() {
        let mut cfg = Config::default();
        cfg.http.base_url = Some("https://catalog.example.org/".to_owned());
        cfg.http.csrf_token = Some("token".to_owned());
        let transport = to_transport(&cfg).unwrap();
        assert_eq!(
            transport.resolve("/api/3/action/package_search").unwrap().as_str(),
            "https://catalog.example.org/api/3/action/package_search"
        );
    }

    #[test]
    fn test_log_config() {
        let mut cfg = Config::default();
        cfg.logging.format = "json".to_owned();
        cfg.logging.target = "stdout".to_owned();
        let log = to_log_config(&cfg).unwrap();
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.target, LogTarget::Stdout);
    }
}
