//! Typed settings attached to definitions.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Settings stored under a fixed key of a definition's settings object.
pub trait DefinitionSettings: Serialize + DeserializeOwned {
    const NAME: &'static str;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContentTypeSettings {
    pub creatable: bool,
    pub listable: bool,
    pub draftable: bool,
    pub versionable: bool,
    pub securable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stereotype: Option<String>,
}

impl DefinitionSettings for ContentTypeSettings {
    const NAME: &'static str = "ContentTypeSettings";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContentPartSettings {
    pub attachable: bool,
    pub reusable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for ContentPartSettings {
    fn default() -> Self {
        Self {
            attachable: true,
            reusable: false,
            display_name: None,
            description: None,
        }
    }
}

impl DefinitionSettings for ContentPartSettings {
    const NAME: &'static str = "ContentPartSettings";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContentTypePartSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl DefinitionSettings for ContentTypePartSettings {
    const NAME: &'static str = "ContentTypePartSettings";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContentPartFieldSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<String>,
}

impl DefinitionSettings for ContentPartFieldSettings {
    const NAME: &'static str = "ContentPartFieldSettings";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaxonomyFieldSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy_content_item_id: Option<String>,
    pub unique: bool,
    pub leaves_only: bool,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl DefinitionSettings for TaxonomyFieldSettings {
    const NAME: &'static str = "TaxonomyFieldSettings";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AutoroutePartSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub allow_custom_path: bool,
    pub allow_update_path: bool,
}

impl DefinitionSettings for AutoroutePartSettings {
    const NAME: &'static str = "AutoroutePartSettings";
}
