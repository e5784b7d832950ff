//! Routing metadata used for the `url` column.

use crate::content::{AutoroutePart, ContentItem};

/// Resolves the canonical path of a content item.
pub trait RouteMetadata: Send + Sync {
    /// Canonical path, or `None` if the item carries no routing data.
    fn canonical_path(&self, item: &ContentItem) -> Option<String>;
}

/// Reads the path from the item's `AutoroutePart`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutorouteMetadata;

impl RouteMetadata for AutorouteMetadata {
    fn canonical_path(&self, item: &ContentItem) -> Option<String> {
        item.get::<AutoroutePart>()
            .and_then(|part| part.path)
            .filter(|path| !path.is_empty())
    }
}
