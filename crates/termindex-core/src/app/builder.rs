//! Builder for configuring TermIndexApp initialization.

use super::TermIndexApp;
use crate::config::PathsConfig;
use crate::content::ContentManager;
use crate::definitions::{ContentDefinitionManager, ContentDefinitionStore};
use crate::index::{RouteMetadata, TermIndexProvider, TermIndexStore};
use crate::layers::{ConditionIdGenerator, LayerService, LayerStore};
use crate::migrations::ThemeMigration;
use crate::services::ServiceRegistry;
use crate::session::IndexSession;
use crate::{Result, TermIndexError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Builder for configuring TermIndexApp initialization.
///
/// # Example
///
/// ```rust,ignore
/// use termindex_core::TermIndexApp;
///
/// let app = TermIndexApp::builder("./site-data")
///     .auto_create_dirs(true)
///     .run_migrations(true)
///     .build()?;
/// ```
pub struct TermIndexAppBuilder {
    data_dir: PathBuf,
    auto_create_dirs: bool,
    run_migrations: bool,
    in_memory: bool,
    routes: Option<Arc<dyn RouteMetadata>>,
}

impl TermIndexAppBuilder {
    /// Create a new builder rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            auto_create_dirs: false,
            run_migrations: false,
            in_memory: false,
            routes: None,
        }
    }

    /// Create the data directory if it doesn't exist.
    ///
    /// Default: `false` (the directory must exist)
    pub fn auto_create_dirs(mut self, enable: bool) -> Self {
        self.auto_create_dirs = enable;
        self
    }

    /// Run the theme migration during `build`.
    ///
    /// Default: `false`
    pub fn run_migrations(mut self, enable: bool) -> Self {
        self.run_migrations = enable;
        self
    }

    /// Keep definitions, layers and the index in memory. The data directory
    /// is ignored.
    ///
    /// Default: `false`
    pub fn in_memory(mut self, enable: bool) -> Self {
        self.in_memory = enable;
        self
    }

    /// Replace the accessor used for the `url` column.
    pub fn with_route_metadata(mut self, routes: Arc<dyn RouteMetadata>) -> Self {
        self.routes = Some(routes);
        self
    }

    fn prepare_data_dir(&self) -> Result<()> {
        if self.data_dir.exists() {
            return Ok(());
        }
        if !self.auto_create_dirs {
            return Err(TermIndexError::Config {
                message: format!("Data directory does not exist: {}", self.data_dir.display()),
            });
        }
        std::fs::create_dir_all(&self.data_dir).map_err(|e| TermIndexError::Io {
            message: format!("Failed to create data directory: {}", self.data_dir.display()),
            path: Some(self.data_dir.clone()),
            source: Some(e),
        })
    }

    /// Build the TermIndexApp instance.
    pub fn build(self) -> Result<TermIndexApp> {
        let (definitions, layers, store) = if self.in_memory {
            (
                ContentDefinitionStore::in_memory(),
                LayerStore::in_memory(),
                TermIndexStore::open_in_memory()?,
            )
        } else {
            self.prepare_data_dir()?;
            (
                ContentDefinitionStore::open(self.data_dir.join(PathsConfig::DEFINITIONS_FILENAME))?,
                LayerStore::open(self.data_dir.join(PathsConfig::LAYERS_FILENAME))?,
                TermIndexStore::open(self.data_dir.join(PathsConfig::INDEX_DB_FILENAME))?,
            )
        };
        let definitions = Arc::new(definitions);
        let layers = Arc::new(layers);
        let store = Arc::new(store);

        let registry = Arc::new(ServiceRegistry::new());
        registry.register::<dyn ContentDefinitionManager>(definitions.clone());
        registry.register::<ContentDefinitionStore>(definitions.clone());
        registry.register::<dyn LayerService>(layers.clone());
        registry.register::<ConditionIdGenerator>(Arc::new(ConditionIdGenerator));

        let mut provider = TermIndexProvider::new(registry.clone());
        if let Some(routes) = self.routes {
            provider = provider.with_route_metadata(routes);
        }
        let provider = Arc::new(provider);

        let session = Arc::new(IndexSession::new(provider.clone(), store.clone()));
        let content = Arc::new(ContentManager::new(session.clone()));

        let app = TermIndexApp {
            data_dir: self.data_dir,
            registry,
            definitions,
            layers,
            store,
            provider,
            session,
            content,
        };

        if self.run_migrations {
            app.migrate()?;
            app.flush()?;
        } else {
            // Queries need the table even before the first migration.
            app.store.create_table()?;
        }

        info!(
            "Term index ready ({})",
            if self.in_memory {
                "in memory".to_string()
            } else {
                app.data_dir.display().to_string()
            }
        );
        Ok(app)
    }
}

impl TermIndexApp {
    /// Theme migration bound to this app's services.
    pub fn theme_migration(&self) -> ThemeMigration {
        ThemeMigration::new(
            self.content.clone(),
            self.definitions.clone(),
            self.layers.clone(),
            ConditionIdGenerator,
            self.store.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_data_dir_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let result = TermIndexAppBuilder::new(temp_dir.path().join("missing")).build();
        assert!(matches!(result, Err(TermIndexError::Config { .. })));
    }

    #[test]
    fn test_auto_create_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("site");

        let app = TermIndexAppBuilder::new(&data_dir)
            .auto_create_dirs(true)
            .build()
            .unwrap();

        assert!(data_dir.exists());
        assert_eq!(
            app.store().db_path(),
            Some(data_dir.join(PathsConfig::INDEX_DB_FILENAME).as_path())
        );
        assert!(app.store().table_exists().unwrap());
    }

    #[test]
    fn test_registry_wiring() {
        let app = TermIndexAppBuilder::new("unused")
            .in_memory(true)
            .build()
            .unwrap();

        let registry = app.registry();
        assert!(registry.contains::<dyn ContentDefinitionManager>());
        assert!(registry.contains::<ContentDefinitionStore>());
        assert!(registry.contains::<dyn LayerService>());
        assert!(registry.contains::<ConditionIdGenerator>());
    }
}
