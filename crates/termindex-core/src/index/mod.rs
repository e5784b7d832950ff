//! Term index: projection of content items onto taxonomy terms.
//!
//! This module provides:
//! - `TermIndexProvider`, which derives rows from a content item
//! - `TermIndexStore`, the SQLite table the rows are written to
//! - `RouteMetadata`, the accessor for the `url` column

mod provider;
mod route;
mod store;

pub use provider::{Projection, SkipReason, TermIndexProvider, TermIndexRow};
pub use route::{AutorouteMetadata, RouteMetadata};
pub use store::{ApplyStats, IndexUpdate, RowFilter, TermIndexStore};

pub(crate) use store::is_valid_id;
