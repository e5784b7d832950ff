//! Application facade wiring definitions, content, layers and the index.

mod builder;

pub use builder::TermIndexAppBuilder;

use crate::content::ContentManager;
use crate::definitions::ContentDefinitionStore;
use crate::index::{RowFilter, TermIndexProvider, TermIndexRow, TermIndexStore};
use crate::layers::LayerStore;
use crate::services::ServiceRegistry;
use crate::session::{FlushSummary, IndexSession};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A fully wired term index site.
///
/// Content changes made through `content()` are queued in the index session
/// and reach the index table on `flush()`.
pub struct TermIndexApp {
    data_dir: PathBuf,
    registry: Arc<ServiceRegistry>,
    definitions: Arc<ContentDefinitionStore>,
    layers: Arc<LayerStore>,
    store: Arc<TermIndexStore>,
    provider: Arc<TermIndexProvider>,
    session: Arc<IndexSession>,
    content: Arc<ContentManager>,
}

impl TermIndexApp {
    pub fn builder(data_dir: impl Into<PathBuf>) -> TermIndexAppBuilder {
        TermIndexAppBuilder::new(data_dir)
    }

    /// An app with every store in memory.
    pub fn in_memory() -> Result<Self> {
        TermIndexAppBuilder::new(PathBuf::new()).in_memory(true).build()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn definitions(&self) -> &Arc<ContentDefinitionStore> {
        &self.definitions
    }

    pub fn layers(&self) -> &Arc<LayerStore> {
        &self.layers
    }

    pub fn store(&self) -> &Arc<TermIndexStore> {
        &self.store
    }

    pub fn provider(&self) -> &Arc<TermIndexProvider> {
        &self.provider
    }

    pub fn session(&self) -> &Arc<IndexSession> {
        &self.session
    }

    pub fn content(&self) -> &Arc<ContentManager> {
        &self.content
    }

    /// Run the theme migration once. Returns the applied version.
    pub fn migrate(&self) -> Result<u32> {
        self.theme_migration().migrate()
    }

    /// Write pending content changes to the index.
    pub fn flush(&self) -> Result<FlushSummary> {
        self.session.flush()
    }

    /// Content items tagged with `term_content_item_id`.
    pub fn items_for_term(
        &self,
        term_content_item_id: &str,
        filter: RowFilter,
    ) -> Result<Vec<TermIndexRow>> {
        self.store.items_for_term(term_content_item_id, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedConfig;
    use crate::layers::LayerService;

    #[test]
    fn test_builder_runs_migrations() {
        let app = TermIndexApp::builder("unused")
            .in_memory(true)
            .run_migrations(true)
            .build()
            .unwrap();

        assert_eq!(app.content().list(SeedConfig::HOME_PAGE_TYPE).len(), 1);
        assert!(app
            .layers()
            .load_layers()
            .unwrap()
            .find(SeedConfig::HOMEPAGE_LAYER_NAME)
            .is_some());
        assert_eq!(app.session().pending(), 0);
        // Seeded types carry no taxonomy field.
        assert_eq!(app.store().count().unwrap(), 0);
        assert!(app.provider().is_ignored(SeedConfig::HOME_PAGE_TYPE));
    }
}
