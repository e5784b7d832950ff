//! Content type, part and field definitions.
//!
//! This module provides:
//! - The resolved definition model consumed by the indexer
//! - Typed settings for types, parts and fields
//! - `ContentDefinitionStore`, an editable store with JSON persistence

mod builder;
mod model;
mod settings;
mod store;

pub use builder::{
    ContentPartDefinitionBuilder, ContentPartFieldDefinitionBuilder,
    ContentTypeDefinitionBuilder, ContentTypePartDefinitionBuilder,
};
pub use model::{
    ContentPartDefinition, ContentPartFieldDefinition, ContentTypeDefinition,
    ContentTypePartDefinition, SettingsMap,
};
pub use settings::{
    AutoroutePartSettings, ContentPartFieldSettings, ContentPartSettings,
    ContentTypePartSettings, ContentTypeSettings, DefinitionSettings, TaxonomyFieldSettings,
};
pub use store::ContentDefinitionStore;

/// Read access to content definitions.
///
/// Lookups never fail: a type that was never defined, or was deleted while
/// items of it still exist, is reported as `None`.
pub trait ContentDefinitionManager: Send + Sync {
    fn get_type_definition(&self, name: &str) -> Option<ContentTypeDefinition>;

    fn get_part_definition(&self, name: &str) -> Option<ContentPartDefinition>;

    fn list_type_definitions(&self) -> Vec<ContentTypeDefinition>;
}
