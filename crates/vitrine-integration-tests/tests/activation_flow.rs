//! End-to-end activation of the catalog search page.

mod common;

use std::sync::Arc;

use serde_json::json;
use vitrine_core::Dom;
use vitrine_events::handler;
use vitrine_modules::{OptionKind, OptionSchema};

use common::{AppHarness, hook};

fn facet_schema() -> OptionSchema {
    OptionSchema::new()
        .option("field", OptionKind::String, "")
        .option("limit", OptionKind::Integer, 10)
        .option("showMore", OptionKind::Bool, false)
}

/// `search-form` announces its endpoint from `initialize`; each
/// `facet-list`, further down the page, listens for it.
fn register_search_page(h: &AppHarness) {
    h.register_with(
        "search-form",
        OptionSchema::new().option("endpoint", OptionKind::String, "/api/3/action/package_search"),
        hook(|sandbox, _| {
            let endpoint = sandbox.options().get_str("endpoint").unwrap_or_default();
            sandbox.publish("search:ready", vec![json!(endpoint)])?;
            Ok(())
        }),
    );
    h.register_with(
        "facet-list",
        facet_schema(),
        hook(|sandbox, log| {
            let field = sandbox.options().get_str("field").unwrap_or_default().to_owned();
            let log = Arc::clone(log);
            sandbox.subscribe(
                "search:ready",
                handler(move |args| {
                    let endpoint = args.first().and_then(|v| v.as_str()).unwrap_or_default();
                    log.lock().unwrap().push(format!("{field} ready {endpoint}"));
                    Ok(())
                }),
            );
            Ok(())
        }),
    );
}

#[test]
fn test_events_published_during_activation_reach_later_modules() {
    let h = AppHarness::new();
    register_search_page(&h);

    let report = h.app.activate(&h.page.dom()).unwrap();
    assert_eq!(report.created, 3);
    assert_eq!(report.skipped_unknown, 2);
    assert!(!h.app.bus().is_queuing());

    assert_eq!(
        h.entries(),
        vec![
            "init search-form",
            "init facet-list",
            "init facet-list",
            "tags ready /api/3/action/package_search",
            "res_format ready /api/3/action/package_search",
        ]
    );
}

#[test]
fn test_rescan_does_not_duplicate_instances() {
    let h = AppHarness::new();
    register_search_page(&h);
    let dom = h.page.dom();

    h.app.activate(&dom).unwrap();
    let second = h.app.activate(&dom).unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped_bound, 3);
    assert_eq!(h.count("init facet-list"), 2);
    assert_eq!(h.app.activator().instance_count(), 3);
    assert_eq!(h.app.bus().subscriber_count("search:ready"), 2);
}

#[test]
fn test_options_come_from_attributes_over_defaults() {
    let h = AppHarness::new();
    h.register_with(
        "facet-list",
        facet_schema(),
        hook(|sandbox, log| {
            let options = sandbox.options();
            log.lock().unwrap().push(format!(
                "{} {} {}",
                options.get_str("field").unwrap_or_default(),
                options.get_i64("limit").unwrap_or_default(),
                options.get_bool("showMore").unwrap_or_default(),
            ));
            Ok(())
        }),
    );

    h.app.activate(&h.page.dom()).unwrap();
    let entries = h.entries();
    assert!(entries.contains(&"tags 5 false".to_owned()));
    assert!(entries.contains(&"res_format 10 false".to_owned()));
}

#[test]
fn test_inserted_content_is_activated() {
    let h = AppHarness::new();
    h.register("dataset-item", OptionSchema::new().option("name", OptionKind::String, ""));
    h.register("follow-button", OptionSchema::new());
    let dom = h.page.dom();

    let first = h.app.activate(&dom).unwrap();
    assert_eq!(first.created, 2);

    let extra = h.page.add_dataset("lakes-of-chile");
    let report = h.app.activate_within(&dom, h.page.dataset_list).unwrap();
    assert_eq!(report.created, 2);
    assert_eq!(report.skipped_bound, 2);
    assert_eq!(
        h.app.activator().modules_on(extra),
        vec!["dataset-item", "follow-button"]
    );
    assert_eq!(h.app.activator().instances("follow-button").len(), 2);
}

#[test]
fn test_reap_tears_down_removed_elements_once() {
    let h = AppHarness::new();
    register_search_page(&h);
    h.register_with(
        "follow-button",
        OptionSchema::new(),
        hook(|sandbox, _| {
            sandbox.subscribe("dataset:followed", handler(|_| Ok(())));
            Ok(())
        }),
    );
    let dom = h.page.dom();
    h.app.activate(&dom).unwrap();
    assert_eq!(h.app.bus().subscriber_count("dataset:followed"), 1);

    h.page.doc.remove(h.page.dataset_item).unwrap();
    assert_eq!(h.app.reap(&*dom), 1);
    assert_eq!(h.app.reap(&*dom), 0);
    assert_eq!(h.count("teardown follow-button"), 1);

    // Only the removed element's subscriptions are gone.
    assert_eq!(h.app.bus().subscriber_count("dataset:followed"), 0);
    assert_eq!(h.app.bus().subscriber_count("search:ready"), 2);
    assert!(!h.app.activator().is_bound(h.page.dataset_item));
}

#[test]
fn test_failed_initialize_does_not_stop_the_pass() {
    let h = AppHarness::new();
    h.register_with(
        "search-form",
        OptionSchema::new(),
        hook(|sandbox, _| {
            sandbox.subscribe("search:submit", handler(|_| Ok(())));
            anyhow::bail!("endpoint unreachable")
        }),
    );
    h.register("facet-list", facet_schema());
    let dom = h.page.dom();

    let report = h.app.activate(&dom).unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.created, 2);
    assert_eq!(h.app.bus().subscriber_count("search:submit"), 0);
    assert!(h.app.activator().instances("search-form").is_empty());
    assert_eq!(h.count("teardown search-form"), 0);

    // A failed pair is not bound, so the next pass retries it.
    let retry = h.app.activate(&dom).unwrap();
    assert_eq!(retry.failed, 1);
    assert_eq!(retry.skipped_bound, 2);
}

#[test]
fn test_shutdown_tears_down_everything() {
    let h = AppHarness::new();
    register_search_page(&h);
    h.app.activate(&h.page.dom()).unwrap();

    assert_eq!(h.app.shutdown(), 3);
    assert_eq!(h.count("teardown facet-list"), 2);
    assert_eq!(h.app.bus().subscriber_count("search:ready"), 0);
    assert_eq!(h.app.activator().instance_count(), 0);
}

#[test]
fn test_custom_module_attribute() {
    let mut config = vitrine_test::test_config();
    config.activation.module_attribute = "data-widget".to_owned();
    let navigator = Arc::new(vitrine_test::RecordingNavigator::new());
    let app = vitrine_runtime::Application::builder(config, navigator)
        .transport(Arc::new(vitrine_test::MockTransport::new()))
        .build()
        .unwrap();
    app.register(
        "search-form",
        vitrine_modules::factory(|_, _, _| anyhow::bail!("never built")),
        OptionSchema::new(),
    )
    .unwrap();

    let page = vitrine_test::catalog_page();
    let report = app.activate(&page.dom()).unwrap();
    assert_eq!(report, vitrine_modules::ActivationReport::default());

    let dom = page.dom();
    dom.set_attribute(page.search_form, "data-widget", "search-form").unwrap();
    assert_eq!(app.activate(&dom).unwrap().failed, 1);
}
