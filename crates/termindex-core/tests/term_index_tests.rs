//! Integration tests for term index projection and persistence.
//!
//! These exercise the public API end to end: definitions are edited through
//! `ContentDefinitionStore`, content through `ContentManager`, and rows are
//! read back from the SQLite store after a session flush.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use termindex_core::content::AutoroutePart;
use termindex_core::definitions::{ContentDefinitionStore, ContentPartDefinition};
use termindex_core::{
    ContentDefinitionManager, ContentItem, ContentTypeDefinition, Projection, RowFilter,
    ServiceRegistry, SkipReason, TaxonomyField, TermIndexApp, TermIndexProvider, VersionOptions,
};

/// Definition service that counts type lookups.
struct CountingDefinitions {
    inner: ContentDefinitionStore,
    lookups: AtomicUsize,
}

impl CountingDefinitions {
    fn new(inner: ContentDefinitionStore) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ContentDefinitionManager for CountingDefinitions {
    fn get_type_definition(&self, name: &str) -> Option<ContentTypeDefinition> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_type_definition(name)
    }

    fn get_part_definition(&self, name: &str) -> Option<ContentPartDefinition> {
        self.inner.get_part_definition(name)
    }

    fn list_type_definitions(&self) -> Vec<ContentTypeDefinition> {
        self.inner.list_type_definitions()
    }
}

/// Article: `Tags` and `Topics` taxonomy fields on the `Article` part.
/// Page: a text field only.
fn define_site(store: &ContentDefinitionStore) {
    store
        .alter_part_definition("Article", |part| {
            part.with_field("Tags", |f| {
                f.of_type("TaxonomyField");
            })
            .with_field("Topics", |f| {
                f.of_type("TaxonomyField");
            })
            .with_field("Subtitle", |f| {
                f.of_type("TextField");
            });
        })
        .unwrap();
    store
        .alter_type_definition("Article", |ty| {
            ty.with_part("TitlePart")
                .with_part("AutoroutePart")
                .with_part("Article");
        })
        .unwrap();

    store
        .alter_part_definition("Page", |part| {
            part.with_field("Body", |f| {
                f.of_type("TextField");
            });
        })
        .unwrap();
    store
        .alter_type_definition("Page", |ty| {
            ty.with_part("TitlePart").with_part("Page");
        })
        .unwrap();
}

fn site_definitions() -> ContentDefinitionStore {
    let store = ContentDefinitionStore::in_memory();
    define_site(&store);
    store
}

fn provider_with_counter() -> (TermIndexProvider, Arc<CountingDefinitions>) {
    let definitions = Arc::new(CountingDefinitions::new(site_definitions()));
    let registry = Arc::new(ServiceRegistry::new());
    registry.register::<dyn ContentDefinitionManager>(definitions.clone());
    (TermIndexProvider::new(registry), definitions)
}

fn article(tags: &[&str], topics: Option<&[&str]>) -> ContentItem {
    let mut item = ContentItem::new("Article").with_display_text("Rust ownership");
    item.published = true;
    item.latest = true;
    item.alter::<AutoroutePart>(|p| p.path = Some("blog/rust-ownership".into()))
        .unwrap();
    item.set_field(
        "Article",
        "Tags",
        &TaxonomyField::with_terms("tags", tags.iter().copied()),
    )
    .unwrap();
    if let Some(topics) = topics {
        item.set_field(
            "Article",
            "Topics",
            &TaxonomyField::with_terms("topics", topics.iter().copied()),
        )
        .unwrap();
    }
    item
}

fn terms(projection: &Projection) -> HashSet<String> {
    projection
        .rows()
        .iter()
        .map(|row| row.term_content_item_id.clone())
        .collect()
}

#[test]
fn test_soft_deleted_item_yields_nothing() {
    let (provider, definitions) = provider_with_counter();
    let mut item = article(&["t1", "t2"], Some(&["t3"]));
    item.published = false;
    item.latest = false;

    let projection = provider.project(&item).unwrap();
    assert_eq!(projection, Projection::Skipped(SkipReason::SoftDeleted));
    assert_eq!(definitions.lookups(), 0);
}

#[test]
fn test_one_field_two_terms() {
    let (provider, _) = provider_with_counter();
    let item = article(&["t1", "t2"], None);

    let projection = provider.project(&item).unwrap();
    let rows = projection.rows();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row.content_item_id, item.content_item_id);
        assert_eq!(row.url.as_deref(), Some("blog/rust-ownership"));
        assert_eq!(row.display_text, "Rust ownership");
        assert!(row.published && row.latest);
    }
    assert_eq!(terms(&projection), HashSet::from(["t1".into(), "t2".into()]));
}

#[test]
fn test_two_fields_union() {
    let (provider, _) = provider_with_counter();
    let item = article(&["t1"], Some(&["t2", "t3"]));

    let projection = provider.project(&item).unwrap();
    assert_eq!(projection.rows().len(), 3);
    assert_eq!(
        terms(&projection),
        HashSet::from(["t1".into(), "t2".into(), "t3".into()])
    );
}

#[test]
fn test_projection_is_idempotent() {
    let (provider, _) = provider_with_counter();
    let item = article(&["t1", "t2"], Some(&["t3"]));

    let first: HashSet<_> = provider.project(&item).unwrap().into_rows().into_iter().collect();
    let second: HashSet<_> = provider.project(&item).unwrap().into_rows().into_iter().collect();
    assert_eq!(first, second);
}

#[test]
fn test_type_without_taxonomy_is_cached() {
    let (provider, definitions) = provider_with_counter();
    let mut page = ContentItem::new("Page");
    page.latest = true;
    let mut other = ContentItem::new("Page");
    other.published = true;

    let first = provider.project(&page).unwrap();
    assert_eq!(first, Projection::Skipped(SkipReason::NoTaxonomyFields));
    assert_eq!(definitions.lookups(), 1);

    let second = provider.project(&other).unwrap();
    assert_eq!(second, Projection::Skipped(SkipReason::CachedType));
    assert_eq!(definitions.lookups(), 1);
    assert_eq!(first.rows(), second.rows());
}

#[test]
fn test_unknown_type_is_skipped_permanently() {
    let (provider, definitions) = provider_with_counter();
    let mut widget = ContentItem::new("RetiredWidget");
    widget.published = true;
    widget.latest = true;

    assert_eq!(
        provider.project(&widget).unwrap(),
        Projection::Skipped(SkipReason::MissingDefinition)
    );
    for _ in 0..3 {
        assert!(provider.project(&widget).unwrap().is_skipped());
    }
    assert_eq!(definitions.lookups(), 1);
    assert_eq!(provider.ignored_types(), vec!["RetiredWidget".to_string()]);
}

#[test]
fn test_malformed_field_does_not_blank_item() {
    let (provider, _) = provider_with_counter();
    let mut item = article(&["t1"], None);
    item.set_field("Article", "Topics", &serde_json::json!({"TermContentItemIds": "oops"}))
        .unwrap();

    let projection = provider.project(&item).unwrap();
    assert_eq!(terms(&projection), HashSet::from(["t1".into()]));
}

#[test]
fn test_concurrent_first_sightings_share_one_entry() {
    let (provider, _) = provider_with_counter();
    let mut a = ContentItem::new("Page");
    a.published = true;
    let mut b = ContentItem::new("Page");
    b.latest = true;

    let (ra, rb) = std::thread::scope(|s| {
        let ha = s.spawn(|| provider.project(&a).unwrap());
        let hb = s.spawn(|| provider.project(&b).unwrap());
        (ha.join().unwrap(), hb.join().unwrap())
    });

    assert!(ra.rows().is_empty() && rb.rows().is_empty());
    assert!(ra.is_skipped() && rb.is_skipped());
    assert_eq!(provider.ignored_types(), vec!["Page".to_string()]);
}

#[test]
fn test_session_replaces_and_retracts_rows() {
    let app = TermIndexApp::in_memory().unwrap();
    define_site(app.definitions());

    let content = app.content();
    let created = content
        .create(article(&["t1", "t2"], None), VersionOptions::Published)
        .unwrap();
    let id = created.content_item_id.clone();
    let summary = app.flush().unwrap();
    assert_eq!(summary.items, 1);
    assert_eq!(summary.rows_inserted, 2);
    assert_eq!(app.store().rows_for_item(&id).unwrap().len(), 2);

    // Narrowing the tags replaces the item's rows.
    let mut edited = created.clone();
    edited
        .set_field("Article", "Tags", &TaxonomyField::with_terms("tags", ["t2"]))
        .unwrap();
    content.update(edited).unwrap();
    app.flush().unwrap();
    let rows = app.store().rows_for_item(&id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].term_content_item_id, "t2");

    content.unpublish(&id).unwrap();
    app.flush().unwrap();
    assert!(app.items_for_term("t2", RowFilter::published()).unwrap().is_empty());
    assert_eq!(app.items_for_term("t2", RowFilter::latest()).unwrap().len(), 1);

    content.remove(&id).unwrap();
    let summary = app.flush().unwrap();
    assert_eq!(summary.skipped, 1);
    assert!(app.store().rows_for_item(&id).unwrap().is_empty());
}

#[test]
fn test_index_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("site");

    let post_id = {
        let app = TermIndexApp::builder(&data_dir)
            .auto_create_dirs(true)
            .run_migrations(true)
            .build()
            .unwrap();
        let categories = app.content().new_item("Taxonomy");
        app.theme_migration().define_post_type(&categories).unwrap();

        let mut post = app.content().new_item("Post").with_display_text("Hello");
        post.set_field(
            "Post",
            "Category",
            &TaxonomyField::with_terms(categories.content_item_id.clone(), ["news"]),
        )
        .unwrap();
        let post = app.content().create(post, VersionOptions::Published).unwrap();
        app.flush().unwrap();
        post.content_item_id
    };

    let app = TermIndexApp::builder(&data_dir)
        .run_migrations(true)
        .build()
        .unwrap();
    let rows = app.items_for_term("news", RowFilter::published()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].content_item_id, post_id);
    assert!(app.definitions().get_type_definition("Post").is_some());
}

#[test]
fn test_oversized_term_in_one_item_does_not_stall_index() {
    let app = TermIndexApp::in_memory().unwrap();
    let categories = app.content().new_item("Taxonomy");
    app.theme_migration().define_post_type(&categories).unwrap();

    let taxonomy_id = categories.content_item_id.clone();
    let mut valid = app.content().new_item("Post").with_display_text("Valid");
    valid
        .set_field(
            "Post",
            "Category",
            &TaxonomyField::with_terms(taxonomy_id.clone(), ["t1"]),
        )
        .unwrap();
    let valid = app.content().create(valid, VersionOptions::Published).unwrap();

    let mut odd = app.content().new_item("Post").with_display_text("Odd");
    odd.set_field(
        "Post",
        "Category",
        &TaxonomyField::with_terms(taxonomy_id, ["z".repeat(27)]),
    )
    .unwrap();
    app.content().create(odd, VersionOptions::Published).unwrap();

    app.flush().unwrap();
    assert_eq!(app.session().pending(), 0);

    let rows = app.items_for_term("t1", RowFilter::published()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].content_item_id, valid.content_item_id);
    assert_eq!(app.store().count().unwrap(), 1);
}
