//! TermIndex Core - content-to-taxonomy-term index for a small CMS.
//!
//! Content items carry taxonomy fields that select terms. This crate projects
//! every saved item onto one row per selected term, so "which items are
//! tagged with this term" is a single indexed query. It also holds the
//! content definitions, layers and seeding migration the index depends on.
//!
//! # Example
//!
//! ```rust,ignore
//! use termindex_core::{RowFilter, TermIndexApp, TaxonomyField, VersionOptions};
//!
//! fn main() -> termindex_core::Result<()> {
//!     let app = TermIndexApp::builder("./site-data")
//!         .auto_create_dirs(true)
//!         .run_migrations(true)
//!         .build()?;
//!
//!     let mut post = app.content().new_item("Post").with_display_text("Hello");
//!     post.set_field("Post", "Category", &TaxonomyField::with_terms("categories", ["rust"]))?;
//!     app.content().create(post, VersionOptions::Published)?;
//!     app.flush()?;
//!
//!     let rows = app.items_for_term("rust", RowFilter::published())?;
//!     println!("{} items tagged", rows.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod content;
pub mod definitions;
pub mod error;
pub mod index;
pub mod layers;
pub mod migrations;
pub mod services;
pub mod session;

mod app;
mod persist;

// Re-export commonly used types
pub use app::{TermIndexApp, TermIndexAppBuilder};
pub use content::{
    generate_id, ContentItem, ContentManager, ContentPart, TaxonomyField, VersionOptions,
};
pub use definitions::{ContentDefinitionManager, ContentDefinitionStore, ContentTypeDefinition};
pub use error::{Result, TermIndexError};
pub use index::{
    IndexUpdate, Projection, RouteMetadata, RowFilter, SkipReason, TermIndexProvider,
    TermIndexRow, TermIndexStore,
};
pub use layers::{LayerService, LayerStore};
pub use migrations::{create_menu_item, ThemeMigration};
pub use services::ServiceRegistry;
pub use session::{FlushSummary, IndexSession};
