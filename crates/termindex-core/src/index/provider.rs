//! Projection of content items onto term index rows.

use super::route::{AutorouteMetadata, RouteMetadata};
use super::store::is_valid_id;
use crate::config::FieldTypes;
use crate::content::{ContentItem, TaxonomyField};
use crate::definitions::ContentDefinitionManager;
use crate::services::ServiceRegistry;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::{debug, warn};

/// One association between a content item and a taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermIndexRow {
    pub content_item_id: String,
    pub term_content_item_id: String,
    pub published: bool,
    pub latest: bool,
    pub url: Option<String>,
    pub display_text: String,
}

/// Why a projection produced no rows without looking at the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither published nor latest.
    SoftDeleted,
    /// The type was already known to have nothing to index.
    CachedType,
    /// The type has no definition.
    MissingDefinition,
    /// The type defines no taxonomy field.
    NoTaxonomyFields,
}

/// Result of projecting one content item.
///
/// Both variants replace every row previously stored for the item. `Rows`
/// with an empty list means the type has taxonomy fields but none of them
/// selects a term.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Skipped(SkipReason),
    Rows(Vec<TermIndexRow>),
}

impl Projection {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Projection::Skipped(_))
    }

    pub fn rows(&self) -> &[TermIndexRow] {
        match self {
            Projection::Skipped(_) => &[],
            Projection::Rows(rows) => rows,
        }
    }

    pub fn into_rows(self) -> Vec<TermIndexRow> {
        match self {
            Projection::Skipped(_) => Vec::new(),
            Projection::Rows(rows) => rows,
        }
    }
}

/// Maps content items to the terms selected in their taxonomy fields.
///
/// Types found to have no definition or no taxonomy field are remembered for
/// the lifetime of the provider and skipped without another definition
/// lookup. The remembered set only grows.
pub struct TermIndexProvider {
    registry: Arc<ServiceRegistry>,
    definitions: OnceLock<Arc<dyn ContentDefinitionManager>>,
    routes: Arc<dyn RouteMetadata>,
    ignored_types: RwLock<HashSet<String>>,
}

impl TermIndexProvider {
    /// Create a provider that resolves the definition service from `registry`
    /// on first use.
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            definitions: OnceLock::new(),
            routes: Arc::new(AutorouteMetadata),
            ignored_types: RwLock::new(HashSet::new()),
        }
    }

    /// Replace the routing metadata accessor.
    pub fn with_route_metadata(mut self, routes: Arc<dyn RouteMetadata>) -> Self {
        self.routes = routes;
        self
    }

    fn definitions(&self) -> Result<&Arc<dyn ContentDefinitionManager>> {
        if let Some(definitions) = self.definitions.get() {
            return Ok(definitions);
        }
        let resolved = self
            .registry
            .get_required::<dyn ContentDefinitionManager>()?;
        Ok(self.definitions.get_or_init(|| resolved))
    }

    /// Whether items of `content_type` are skipped without a lookup.
    pub fn is_ignored(&self, content_type: &str) -> bool {
        match self.ignored_types.read() {
            Ok(set) => set.contains(content_type),
            Err(poisoned) => poisoned.into_inner().contains(content_type),
        }
    }

    /// Snapshot of the skipped types, sorted.
    pub fn ignored_types(&self) -> Vec<String> {
        let mut types: Vec<String> = match self.ignored_types.read() {
            Ok(set) => set.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        };
        types.sort();
        types
    }

    fn ignore(&self, content_type: &str) {
        let mut set = match self.ignored_types.write() {
            Ok(set) => set,
            Err(poisoned) => poisoned.into_inner(),
        };
        if set.insert(content_type.to_string()) {
            debug!("Ignoring content type {} for term index", content_type);
        }
    }

    /// Project a content item onto index rows.
    ///
    /// Fails only if no definition service is registered.
    pub fn project(&self, item: &ContentItem) -> Result<Projection> {
        if !item.published && !item.latest {
            return Ok(Projection::Skipped(SkipReason::SoftDeleted));
        }

        if self.is_ignored(&item.content_type) {
            return Ok(Projection::Skipped(SkipReason::CachedType));
        }

        let definitions = self.definitions()?;

        // Items can outlive their type, e.g. widgets of a deleted layer.
        let Some(definition) = definitions.get_type_definition(&item.content_type) else {
            self.ignore(&item.content_type);
            return Ok(Projection::Skipped(SkipReason::MissingDefinition));
        };

        let fields: Vec<_> = definition
            .fields_of_type(FieldTypes::TAXONOMY_FIELD)
            .collect();
        if fields.is_empty() {
            self.ignore(&item.content_type);
            return Ok(Projection::Skipped(SkipReason::NoTaxonomyFields));
        }

        let url = self.routes.canonical_path(item);
        let mut rows = Vec::new();

        for (part, field) in fields {
            let Some(value) = item.field_value(&part.name, &field.name) else {
                continue;
            };

            let taxonomy = match TaxonomyField::decode(value) {
                Ok(taxonomy) => taxonomy,
                Err(e) => {
                    warn!(
                        "Skipping field {}.{} of content item {}: {}",
                        part.name, field.name, item.content_item_id, e
                    );
                    continue;
                }
            };

            rows.extend(
                taxonomy
                    .term_content_item_ids
                    .into_iter()
                    .filter(|term| {
                        let valid = is_valid_id(term);
                        if !valid {
                            warn!(
                                "Skipping term '{}' in field {}.{} of content item {}",
                                term, part.name, field.name, item.content_item_id
                            );
                        }
                        valid
                    })
                    .map(|term_content_item_id| TermIndexRow {
                        content_item_id: item.content_item_id.clone(),
                        term_content_item_id,
                        published: item.published,
                        latest: item.latest,
                        url: url.clone(),
                        display_text: item.display_text.clone(),
                    }),
            );
        }

        debug!(
            "Projected {} term rows for content item {}",
            rows.len(),
            item.content_item_id
        );
        Ok(Projection::Rows(rows))
    }
}

impl std::fmt::Debug for TermIndexProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermIndexProvider")
            .field("resolved", &self.definitions.get().is_some())
            .field("ignored_types", &self.ignored_types())
            .finish()
    }
}
