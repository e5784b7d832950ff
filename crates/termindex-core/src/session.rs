//! Index session: buffers content changes and writes their projections.

use crate::content::ContentItem;
use crate::index::{is_valid_id, IndexUpdate, TermIndexProvider, TermIndexStore};
use crate::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Outcome of a flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushSummary {
    /// Distinct content items written.
    pub items: usize,
    /// Items whose projection was skipped (all rows retracted).
    pub skipped: usize,
    pub rows_deleted: usize,
    pub rows_inserted: usize,
}

/// Pending snapshots keyed by content item, in order of first save.
#[derive(Default)]
struct PendingItems {
    order: Vec<String>,
    items: HashMap<String, ContentItem>,
}

impl PendingItems {
    /// Keep `item` as the snapshot of its content item.
    fn insert(&mut self, item: ContentItem) {
        let id = item.content_item_id.clone();
        if self.items.insert(id.clone(), item).is_none() {
            self.order.push(id);
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn into_items(mut self) -> Vec<ContentItem> {
        self.order
            .iter()
            .filter_map(|id| self.items.remove(id))
            .collect()
    }

    /// Put back the items of a failed flush. Snapshots saved since then win.
    fn restore(&mut self, failed: Vec<ContentItem>) {
        let newer = std::mem::take(self);
        for item in failed {
            self.insert(item);
        }
        for item in newer.into_items() {
            self.insert(item);
        }
    }
}

/// Collects saved content items and applies their index rows on flush.
///
/// Only the last saved snapshot of an item is projected. A flush applies all
/// pending items in one transaction; if projection or the write fails, the
/// pending items are kept for the next flush.
pub struct IndexSession {
    provider: Arc<TermIndexProvider>,
    store: Arc<TermIndexStore>,
    pending: Mutex<PendingItems>,
    flush_lock: Mutex<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl IndexSession {
    pub fn new(provider: Arc<TermIndexProvider>, store: Arc<TermIndexStore>) -> Self {
        Self {
            provider,
            store,
            pending: Mutex::new(PendingItems::default()),
            flush_lock: Mutex::new(()),
        }
    }

    pub fn provider(&self) -> &Arc<TermIndexProvider> {
        &self.provider
    }

    pub fn store(&self) -> &Arc<TermIndexStore> {
        &self.store
    }

    /// Record the current state of a content item, replacing any snapshot
    /// of it that is still pending.
    pub fn save(&self, item: ContentItem) {
        debug!("Session saved content item {}", item.content_item_id);
        lock(&self.pending).insert(item);
    }

    /// Number of distinct content items waiting for a flush.
    pub fn pending(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Project every pending item and write the results.
    pub fn flush(&self) -> Result<FlushSummary> {
        let _flushing = lock(&self.flush_lock);
        let items = std::mem::take(&mut *lock(&self.pending)).into_items();
        if items.is_empty() {
            return Ok(FlushSummary::default());
        }

        match self.write(&items) {
            Ok(summary) => {
                debug!(
                    "Flushed {} content items ({} rows inserted, {} deleted)",
                    summary.items, summary.rows_inserted, summary.rows_deleted
                );
                Ok(summary)
            }
            Err(e) => {
                lock(&self.pending).restore(items);
                Err(e)
            }
        }
    }

    fn write(&self, items: &[ContentItem]) -> Result<FlushSummary> {
        let mut summary = FlushSummary::default();
        let mut updates = Vec::with_capacity(items.len());
        for item in items {
            let id = item.content_item_id.as_str();
            // Such an item can have no rows, and retracting it matches nothing.
            if !is_valid_id(id) {
                warn!("Dropping content item with unusable id '{}'", id);
                continue;
            }
            let projection = self.provider.project(item)?;
            if projection.is_skipped() {
                summary.skipped += 1;
            }
            updates.push(IndexUpdate::new(id, projection.into_rows()));
        }

        let stats = self.store.apply(&updates)?;
        summary.items = stats.items;
        summary.rows_deleted = stats.rows_deleted;
        summary.rows_inserted = stats.rows_inserted;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldTypes;
    use crate::content::TaxonomyField;
    use crate::definitions::{ContentDefinitionManager, ContentDefinitionStore};
    use crate::index::RowFilter;
    use crate::services::ServiceRegistry;

    fn setup(register_definitions: bool) -> (IndexSession, Arc<ServiceRegistry>) {
        let definitions = ContentDefinitionStore::in_memory();
        definitions
            .alter_part_definition("Post", |part| {
                part.with_field("Category", |f| {
                    f.of_type(FieldTypes::TAXONOMY_FIELD);
                });
            })
            .unwrap();
        definitions
            .alter_type_definition("Post", |ty| {
                ty.with_part("Post");
            })
            .unwrap();

        let registry = Arc::new(ServiceRegistry::new());
        if register_definitions {
            registry.register::<dyn ContentDefinitionManager>(Arc::new(definitions));
        }
        let store = Arc::new(TermIndexStore::open_in_memory().unwrap());
        store.create_table().unwrap();
        let provider = Arc::new(TermIndexProvider::new(registry.clone()));
        (IndexSession::new(provider, store), registry)
    }

    fn post(id: &str, terms: &[&str]) -> ContentItem {
        let mut item = ContentItem::new("Post");
        item.content_item_id = id.to_string();
        item.published = true;
        item.latest = true;
        item.set_field(
            "Post",
            "Category",
            &TaxonomyField::with_terms("categories", terms.iter().copied()),
        )
        .unwrap();
        item
    }

    #[test]
    fn test_flush_writes_rows() {
        let (session, _) = setup(true);
        session.save(post("item1", &["t1", "t2"]));
        assert_eq!(session.pending(), 1);

        let summary = session.flush().unwrap();
        assert_eq!(summary.items, 1);
        assert_eq!(summary.rows_inserted, 2);
        assert_eq!(session.pending(), 0);
        assert_eq!(session.store().rows_for_item("item1").unwrap().len(), 2);
    }

    #[test]
    fn test_last_snapshot_wins() {
        let (session, _) = setup(true);
        session.save(post("item1", &["t1", "t2"]));
        session.save(post("item1", &["t3"]));
        assert_eq!(session.pending(), 1);

        session.flush().unwrap();
        let rows = session.store().rows_for_item("item1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].term_content_item_id, "t3");
    }

    #[test]
    fn test_soft_delete_retracts() {
        let (session, _) = setup(true);
        session.save(post("item1", &["t1"]));
        session.flush().unwrap();

        let mut removed = post("item1", &["t1"]);
        removed.published = false;
        removed.latest = false;
        session.save(removed);

        let summary = session.flush().unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.rows_deleted, 1);
        assert!(session.store().rows_for_item("item1").unwrap().is_empty());
    }

    #[test]
    fn test_empty_flush_is_noop() {
        let (session, _) = setup(true);
        assert_eq!(session.flush().unwrap(), FlushSummary::default());
    }

    #[test]
    fn test_failed_flush_keeps_pending() {
        let (session, registry) = setup(false);
        session.save(post("item1", &["t1"]));

        assert!(session.flush().is_err());
        assert_eq!(session.pending(), 1);

        let definitions = ContentDefinitionStore::in_memory();
        definitions
            .alter_type_definition("Post", |ty| {
                ty.with_part("Post");
            })
            .unwrap();
        registry.register::<dyn ContentDefinitionManager>(Arc::new(definitions));

        let summary = session.flush().unwrap();
        assert_eq!(summary.items, 1);
        assert_eq!(session.pending(), 0);
    }

    #[test]
    fn test_oversized_term_does_not_block_other_items() {
        let (session, _) = setup(true);
        let long_term = "x".repeat(27);
        session.save(post("item1", &["t1"]));
        session.save(post("item2", &[long_term.as_str(), "t2"]));

        let summary = session.flush().unwrap();
        assert_eq!(summary.items, 2);
        assert_eq!(session.pending(), 0);
        assert_eq!(session.store().rows_for_item("item1").unwrap().len(), 1);

        let rows = session.store().rows_for_item("item2").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].term_content_item_id, "t2");

        // Later flushes keep working.
        session.save(post("item3", &["t1"]));
        assert_eq!(session.flush().unwrap().items, 1);
        assert_eq!(
            session.store().items_for_term("t1", RowFilter::any()).unwrap().len(),
            2
        );
    }

    #[test]
    fn test_unusable_item_id_is_dropped() {
        let (session, _) = setup(true);
        session.save(post(&"y".repeat(27), &["t1"]));
        session.save(post("item1", &["t1"]));

        let summary = session.flush().unwrap();
        assert_eq!(summary.items, 1);
        assert_eq!(session.pending(), 0);
        assert_eq!(session.store().count().unwrap(), 1);
    }

    #[test]
    fn test_pending_keeps_one_snapshot_per_item() {
        let mut pending = PendingItems::default();
        pending.insert(post("a", &["t1"]));
        pending.insert(post("b", &["t1"]));
        pending.insert(post("a", &["t2"]));
        assert_eq!(pending.len(), 2);

        let items = pending.into_items();
        let ids: Vec<_> = items.iter().map(|i| i.content_item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        let terms = TaxonomyField::decode(items[0].field_value("Post", "Category").unwrap())
            .unwrap()
            .term_content_item_ids;
        assert_eq!(terms, vec!["t2".to_string()]);
    }

    #[test]
    fn test_restore_prefers_newer_snapshots() {
        let mut pending = PendingItems::default();
        pending.insert(post("b", &["new"]));
        pending.insert(post("c", &["t1"]));
        pending.restore(vec![post("a", &["t1"]), post("b", &["old"])]);

        let items = pending.into_items();
        let ids: Vec<_> = items.iter().map(|i| i.content_item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let terms = TaxonomyField::decode(items[1].field_value("Post", "Category").unwrap())
            .unwrap()
            .term_content_item_ids;
        assert_eq!(terms, vec!["new".to_string()]);
    }
}
