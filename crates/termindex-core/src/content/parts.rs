//! Built-in content parts.

use super::item::{ContentItem, ContentPart};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TitlePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ContentPart for TitlePart {
    const NAME: &'static str = "TitlePart";
}

/// Routing metadata: the item's canonical path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AutoroutePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub set_homepage: bool,
    pub disabled: bool,
    pub route_contained_items: bool,
}

impl ContentPart for AutoroutePart {
    const NAME: &'static str = "AutoroutePart";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AliasPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ContentPart for AliasPart {
    const NAME: &'static str = "AliasPart";
}

/// Marker part for owner and date editors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonPart {}

impl ContentPart for CommonPart {
    const NAME: &'static str = "CommonPart";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MarkdownBodyPart {
    pub markdown: String,
}

impl ContentPart for MarkdownBodyPart {
    const NAME: &'static str = "MarkdownBodyPart";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LinkMenuItemPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ContentPart for LinkMenuItemPart {
    const NAME: &'static str = "LinkMenuItemPart";
}

/// Menu items embedded in a menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MenuItemsListPart {
    pub menu_items: Vec<ContentItem>,
}

impl ContentPart for MenuItemsListPart {
    const NAME: &'static str = "MenuItemsListPart";
}
