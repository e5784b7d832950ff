//! Content items and typed part access.

use super::ids::generate_id;
use crate::{Result, TermIndexError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// A part stored in a content item under a fixed key.
pub trait ContentPart: Serialize + DeserializeOwned + Default {
    /// Key of the part in the item's content document.
    const NAME: &'static str;
}

/// A versioned piece of content.
///
/// Parts live in `content`, keyed by part name, each holding an object of
/// part properties and fields. The document is decoded on demand; nothing in
/// it is validated against the item's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentItem {
    pub content_item_id: String,
    pub content_item_version_id: String,
    pub content_type: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub latest: bool,
    #[serde(default)]
    pub display_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_utc: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_utc: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_utc: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl ContentItem {
    /// Create an unsaved item of the given type with fresh identifiers.
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_item_id: generate_id(),
            content_item_version_id: generate_id(),
            content_type: content_type.into(),
            published: false,
            latest: false,
            display_text: String::new(),
            owner: None,
            created_utc: None,
            modified_utc: None,
            published_utc: None,
            content: Map::new(),
        }
    }

    /// Builder-style helper to set the display text.
    pub fn with_display_text(mut self, display_text: impl Into<String>) -> Self {
        self.display_text = display_text.into();
        self
    }

    /// Raw object of a part, if present and an object.
    pub fn part(&self, part_name: &str) -> Option<&Map<String, Value>> {
        self.content.get(part_name).and_then(Value::as_object)
    }

    /// Raw value of a field on a part.
    pub fn field_value(&self, part_name: &str, field_name: &str) -> Option<&Value> {
        self.part(part_name).and_then(|part| part.get(field_name))
    }

    /// Decode a typed part. Returns `None` if absent or if its shape does not
    /// match `P`.
    pub fn get<P: ContentPart>(&self) -> Option<P> {
        let value = self.content.get(P::NAME)?;
        match serde_json::from_value(value.clone()) {
            Ok(part) => Some(part),
            Err(e) => {
                warn!(
                    "Content item {} has an undecodable {}: {}",
                    self.content_item_id,
                    P::NAME,
                    e
                );
                None
            }
        }
    }

    /// Load a part (or its default), modify it, and merge it back.
    ///
    /// Keys of the stored part object that `P` does not know about, such as
    /// fields attached to the part, are kept.
    pub fn alter<P: ContentPart>(&mut self, f: impl FnOnce(&mut P)) -> Result<&mut Self> {
        let mut part = self.get::<P>().unwrap_or_default();
        f(&mut part);
        let value = serde_json::to_value(&part)?;
        self.merge_part(P::NAME, value)?;
        Ok(self)
    }

    /// Store a serializable value as a field of a part, creating the part
    /// object if needed.
    pub fn set_field<F: Serialize>(
        &mut self,
        part_name: &str,
        field_name: &str,
        field: &F,
    ) -> Result<&mut Self> {
        let value = serde_json::to_value(field)?;
        let mut patch = Map::new();
        patch.insert(field_name.to_string(), value);
        self.merge_part(part_name, Value::Object(patch))?;
        Ok(self)
    }

    fn merge_part(&mut self, part_name: &str, patch: Value) -> Result<()> {
        let Value::Object(patch) = patch else {
            return Err(TermIndexError::Validation {
                field: part_name.to_string(),
                message: "part must serialize to an object".to_string(),
            });
        };

        let entry = self
            .content
            .entry(part_name.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(existing) = entry {
            existing.extend(patch);
        }
        Ok(())
    }
}
