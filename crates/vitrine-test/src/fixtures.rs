//! Test fixtures: a catalog search page, a translation catalog and a
//! configuration.

use std::sync::Arc;

use serde_json::{Value, json};
use vitrine_config::Config;
use vitrine_core::{Dom, ElementId, ElementSpec, MemoryDocument};

/// URL of the search page built by [`catalog_page`].
pub const CATALOG_PAGE_URL: &str =
    "https://catalog.example.org/dataset?q=water&filters=tags:rivers|res_format:CSV&page=2";

/// A dataset search page.
///
/// ```text
/// html
/// ├── form#dataset-search           data-module="search-form"
/// ├── section.facets
/// │   ├── div.facet                 data-module="facet-list" (tags, limit 5)
/// │   └── div.facet                 data-module="facet-list" (res_format)
/// └── ul.datasets
///     └── li.dataset-item           data-module="dataset-item follow-button"
/// ```
#[derive(Debug, Clone)]
pub struct CatalogPage {
    /// The document.
    pub doc: Arc<MemoryDocument>,
    /// The search form.
    pub search_form: ElementId,
    /// The facet section.
    pub facet_section: ElementId,
    /// The two facet lists, in document order.
    pub facets: Vec<ElementId>,
    /// The dataset list.
    pub dataset_list: ElementId,
    /// The single dataset item.
    pub dataset_item: ElementId,
}

impl CatalogPage {
    /// The document as a trait object, as the activator takes it.
    #[must_use]
    pub fn dom(&self) -> Arc<dyn Dom> {
        self.doc.clone()
    }

    /// Append another dataset item to the list.
    ///
    /// # Panics
    ///
    /// Panics if the document's lock is poisoned.
    #[must_use]
    pub fn add_dataset(&self, name: &str) -> ElementId {
        self.doc
            .append(self.dataset_list, dataset_item(name))
            .expect("Failed to append dataset item")
    }
}

fn dataset_item(name: &str) -> ElementSpec {
    ElementSpec::new("li")
        .class("dataset-item")
        .attr("data-module", "dataset-item follow-button")
        .attr("data-module-name", name)
        .child(ElementSpec::new("a").class("title").attr("href", format!("/dataset/{name}")))
}

/// Build the catalog search page.
///
/// # Panics
///
/// Panics if an append fails, which a fresh document never does.
#[must_use]
pub fn catalog_page() -> CatalogPage {
    let doc = Arc::new(MemoryDocument::new());
    let root = doc.root();

    let search_form = doc
        .append(
            root,
            ElementSpec::new("form")
                .id("dataset-search")
                .attr("data-module", "search-form")
                .attr("data-module-endpoint", "/api/3/action/package_search")
                .child(ElementSpec::new("input").attr("name", "q").attr("value", "water")),
        )
        .expect("Failed to build catalog page");

    let facet_section = doc
        .append(root, ElementSpec::new("section").class("facets"))
        .expect("Failed to build catalog page");
    let facets = vec![
        doc.append(
            facet_section,
            ElementSpec::new("div")
                .class("facet")
                .attr("data-module", "facet-list")
                .attr("data-module-field", "tags")
                .attr("data-module-limit", "5"),
        )
        .expect("Failed to build catalog page"),
        doc.append(
            facet_section,
            ElementSpec::new("div")
                .class("facet")
                .attr("data-module", "facet-list")
                .attr("data-module-field", "res_format"),
        )
        .expect("Failed to build catalog page"),
    ];

    let dataset_list = doc
        .append(root, ElementSpec::new("ul").class("datasets"))
        .expect("Failed to build catalog page");
    let dataset_item = doc
        .append(dataset_list, dataset_item("rivers-of-brazil"))
        .expect("Failed to build catalog page");

    CatalogPage {
        doc,
        search_form,
        facet_section,
        facets,
        dataset_list,
        dataset_item,
    }
}

/// A Brazilian Portuguese catalog in the domain-keyed JSON layout.
#[must_use]
pub fn pt_br_catalog() -> Value {
    json!({
        "domain": "vitrine",
        "locale_data": {
            "vitrine": {
                "": {
                    "domain": "vitrine",
                    "lang": "pt_BR",
                    "plural_forms": "nplurals=2; plural=(n > 1);"
                },
                "Follow": [null, "Seguir"],
                "Unfollow": [null, "Deixar de seguir"],
                "Show more %(facet)s": [null, "Mostrar mais %(facet)s"],
                "%(num)s dataset found": [null, "%(num)s conjunto encontrado", "%(num)s conjuntos encontrados"]
            }
        }
    })
}

/// Default configuration pointed at the fixture host.
#[must_use]
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.http.base_url = Some("https://catalog.example.org/".to_owned());
    config.http.timeout_secs = 5;
    config
}
