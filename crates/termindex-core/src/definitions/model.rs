//! Resolved content type definitions.

use super::settings::DefinitionSettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Settings stored as an object keyed by settings type name.
pub type SettingsMap = Map<String, Value>;

pub(crate) fn read_settings<S: DefinitionSettings>(settings: &SettingsMap) -> Option<S> {
    settings
        .get(S::NAME)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

/// A content type with its parts resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeDefinition {
    pub name: String,
    pub display_name: String,
    pub parts: Vec<ContentTypePartDefinition>,
    #[serde(default)]
    pub settings: SettingsMap,
}

impl ContentTypeDefinition {
    pub fn settings<S: DefinitionSettings>(&self) -> Option<S> {
        read_settings(&self.settings)
    }

    pub fn part(&self, name: &str) -> Option<&ContentTypePartDefinition> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Every field across all attached parts whose field type is
    /// `field_type`, paired with the definition of the part that holds it.
    pub fn fields_of_type<'a>(
        &'a self,
        field_type: &'a str,
    ) -> impl Iterator<Item = (&'a ContentPartDefinition, &'a ContentPartFieldDefinition)> + 'a
    {
        self.parts.iter().flat_map(move |type_part| {
            type_part
                .part_definition
                .fields
                .iter()
                .filter(move |field| field.field_type == field_type)
                .map(move |field| (&type_part.part_definition, field))
        })
    }
}

/// A part as attached to a type, with per-type settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypePartDefinition {
    pub name: String,
    pub part_definition: ContentPartDefinition,
    #[serde(default)]
    pub settings: SettingsMap,
}

impl ContentTypePartDefinition {
    pub fn settings<S: DefinitionSettings>(&self) -> Option<S> {
        read_settings(&self.settings)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPartDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<ContentPartFieldDefinition>,
    #[serde(default)]
    pub settings: SettingsMap,
}

impl ContentPartDefinition {
    /// An undefined part referenced by name only.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            settings: SettingsMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&ContentPartFieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn settings<S: DefinitionSettings>(&self) -> Option<S> {
        read_settings(&self.settings)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPartFieldDefinition {
    pub name: String,
    /// Name of the field type, e.g. `TaxonomyField`.
    pub field_type: String,
    #[serde(default)]
    pub settings: SettingsMap,
}

impl ContentPartFieldDefinition {
    pub fn settings<S: DefinitionSettings>(&self) -> Option<S> {
        read_settings(&self.settings)
    }
}
