//! Layered configuration feeding a running application.

use std::collections::HashMap;
use std::sync::Arc;

use vitrine_config::loader::load_from;
use vitrine_config::{ConfigError, ConfigLayer};
use vitrine_core::Dom;
use vitrine_modules::{Component, OptionSchema, factory};
use vitrine_runtime::Application;
use vitrine_sandbox::{NotificationKind, Sandbox};
use vitrine_test::{
    CATALOG_PAGE_URL, MockTransport, RecordingNavigator, RecordingNotifier, TestContext,
    catalog_page, pt_br_catalog,
};

struct FollowButton {
    sandbox: Arc<Sandbox>,
}

impl Component for FollowButton {
    fn initialize(&mut self) -> anyhow::Result<()> {
        let label = self.sandbox.translate("Follow", &[]);
        self.sandbox.set_attribute("aria-label", &label)?;
        self.sandbox.notify(&label, "ready", NotificationKind::Info);
        Ok(())
    }

    fn teardown(&mut self) {}
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[test]
fn test_user_config_drives_the_application() {
    vitrine_test::setup_test_logging_default();
    let ctx = TestContext::new();
    let catalog = ctx.create_file("pt_BR.json", &pt_br_catalog().to_string());
    ctx.write_config(&format!(
        "[filters]\nparam = \"f\"\n\n[i18n]\ncatalog_path = '{}'\n",
        catalog.display()
    ));

    let resolved = load_from(
        Some(ctx.path()),
        None,
        &env(&[("VITRINE_FILTER_PARAM", "ignored"), ("VITRINE_LOCALE", "pt_BR")]),
    )
    .unwrap();
    assert_eq!(resolved.config.filters.param, "f");
    assert_eq!(resolved.config.i18n.locale, "pt_BR");
    assert_eq!(resolved.source_of("filters.param"), Some(&ConfigLayer::User));
    assert_eq!(resolved.source_of("i18n.locale"), Some(&ConfigLayer::Environment));
    assert_eq!(resolved.loaded_files.len(), 1);

    let navigator = Arc::new(RecordingNavigator::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let app = Application::builder(resolved.config, navigator)
        .transport(Arc::new(MockTransport::new()))
        .notifier(notifier.clone())
        .build()
        .unwrap();
    app.register(
        "follow-button",
        factory(|_, _, sandbox| Ok(Box::new(FollowButton { sandbox }))),
        OptionSchema::new(),
    )
    .unwrap();

    let page = catalog_page();
    let dom = page.dom();
    assert_eq!(app.activate(&dom).unwrap().created, 1);
    assert_eq!(dom.attribute(page.dataset_item, "aria-label").as_deref(), Some("Seguir"));
    assert_eq!(notifier.notifications()[0].title, "Seguir");

    // The default `filters` parameter is not read under `f`.
    let store = app.filters(CATALOG_PAGE_URL).unwrap();
    assert!(store.all().is_empty());
    assert_eq!(store.param(), "f");
}

#[test]
fn test_explicit_file_overrides_user_file() {
    let user = TestContext::new();
    user.write_config("[http]\ntimeout_secs = 10\nbase_url = \"https://user.example.org/\"\n");
    let explicit = TestContext::new();
    let path = explicit.create_file("site.toml", "[http]\ntimeout_secs = 20\n");

    let resolved = load_from(Some(user.path()), Some(&path), &HashMap::new()).unwrap();
    assert_eq!(resolved.config.http.timeout_secs, 20);
    assert_eq!(
        resolved.config.http.base_url.as_deref(),
        Some("https://user.example.org/")
    );
    assert_eq!(resolved.source_of("http.timeout_secs"), Some(&ConfigLayer::Explicit));
    assert_eq!(resolved.loaded_files.len(), 2);

    // The default transport is built from `[http]`.
    let app = Application::builder(resolved.config, Arc::new(RecordingNavigator::new()))
        .build()
        .unwrap();
    assert_eq!(app.config().http.timeout_secs, 20);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let ctx = TestContext::new();
    let err = load_from(None, Some(&ctx.path().join("absent.toml")), &HashMap::new()).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
}

#[test]
fn test_invalid_values_are_rejected() {
    let ctx = TestContext::new();
    ctx.write_config("[filters]\nparam = \"a&b\"\n");
    let err = load_from(Some(ctx.path()), None, &HashMap::new()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));

    let ctx = TestContext::new();
    ctx.write_config("[http]\ntimeout_secs = \"soon\"\n");
    assert!(load_from(Some(ctx.path()), None, &HashMap::new()).is_err());
}

#[test]
fn test_missing_catalog_file_fails_the_build() {
    let mut config = vitrine_test::test_config();
    config.i18n.catalog_path = Some("/nonexistent/vitrine/pt_BR.json".to_owned());
    let result = Application::builder(config, Arc::new(RecordingNavigator::new()))
        .transport(Arc::new(MockTransport::new()))
        .build();
    assert!(matches!(result, Err(vitrine_runtime::RuntimeError::I18n(_))));
}
