//! Builders used by `alter_type_definition` and `alter_part_definition`.
//!
//! Builders borrow the stored record and edit it in place; chained calls
//! return `&mut Self`.

use super::model::{read_settings, ContentPartDefinition, ContentPartFieldDefinition, SettingsMap};
use super::settings::{
    ContentPartFieldSettings, ContentPartSettings, ContentTypePartSettings, ContentTypeSettings,
    DefinitionSettings,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Stored form of a type: parts are referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TypeRecord {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub settings: SettingsMap,
    #[serde(default)]
    pub parts: Vec<TypePartRecord>,
}

impl TypeRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            settings: SettingsMap::new(),
            parts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TypePartRecord {
    pub name: String,
    pub part_name: String,
    #[serde(default)]
    pub settings: SettingsMap,
}

fn write_settings<S: DefinitionSettings>(settings: &mut SettingsMap, value: &S) {
    match serde_json::to_value(value) {
        Ok(v) => {
            settings.insert(S::NAME.to_string(), v);
        }
        Err(e) => warn!("Failed to serialize {}: {}", S::NAME, e),
    }
}

fn alter_settings<S: DefinitionSettings + Default>(
    settings: &mut SettingsMap,
    f: impl FnOnce(&mut S),
) {
    let mut current: S = read_settings(settings).unwrap_or_default();
    f(&mut current);
    write_settings(settings, &current);
}

pub struct ContentTypeDefinitionBuilder<'a> {
    record: &'a mut TypeRecord,
}

impl<'a> ContentTypeDefinitionBuilder<'a> {
    pub(crate) fn new(record: &'a mut TypeRecord) -> Self {
        Self { record }
    }

    pub fn display_name(&mut self, display_name: &str) -> &mut Self {
        self.record.display_name = display_name.to_string();
        self
    }

    /// Attach a part by name. Attaching an already attached part is a no-op.
    pub fn with_part(&mut self, part_name: &str) -> &mut Self {
        self.with_part_configured(part_name, |_| {})
    }

    /// Attach a part by name and edit its per-type settings.
    pub fn with_part_configured(
        &mut self,
        part_name: &str,
        f: impl FnOnce(&mut ContentTypePartDefinitionBuilder<'_>),
    ) -> &mut Self {
        let index = match self.record.parts.iter().position(|p| p.name == part_name) {
            Some(index) => index,
            None => {
                self.record.parts.push(TypePartRecord {
                    name: part_name.to_string(),
                    part_name: part_name.to_string(),
                    settings: SettingsMap::new(),
                });
                self.record.parts.len() - 1
            }
        };
        f(&mut ContentTypePartDefinitionBuilder {
            record: &mut self.record.parts[index],
        });
        self
    }

    pub fn remove_part(&mut self, part_name: &str) -> &mut Self {
        self.record.parts.retain(|p| p.name != part_name);
        self
    }

    pub fn with_settings<S: DefinitionSettings>(&mut self, settings: &S) -> &mut Self {
        write_settings(&mut self.record.settings, settings);
        self
    }

    pub fn creatable(&mut self, creatable: bool) -> &mut Self {
        alter_settings::<ContentTypeSettings>(&mut self.record.settings, |s| {
            s.creatable = creatable
        });
        self
    }

    pub fn listable(&mut self, listable: bool) -> &mut Self {
        alter_settings::<ContentTypeSettings>(&mut self.record.settings, |s| s.listable = listable);
        self
    }

    pub fn draftable(&mut self, draftable: bool) -> &mut Self {
        alter_settings::<ContentTypeSettings>(&mut self.record.settings, |s| {
            s.draftable = draftable
        });
        self
    }

    pub fn versionable(&mut self, versionable: bool) -> &mut Self {
        alter_settings::<ContentTypeSettings>(&mut self.record.settings, |s| {
            s.versionable = versionable
        });
        self
    }

    pub fn securable(&mut self, securable: bool) -> &mut Self {
        alter_settings::<ContentTypeSettings>(&mut self.record.settings, |s| {
            s.securable = securable
        });
        self
    }

    pub fn stereotype(&mut self, stereotype: &str) -> &mut Self {
        alter_settings::<ContentTypeSettings>(&mut self.record.settings, |s| {
            s.stereotype = Some(stereotype.to_string())
        });
        self
    }
}

pub struct ContentTypePartDefinitionBuilder<'a> {
    record: &'a mut TypePartRecord,
}

impl ContentTypePartDefinitionBuilder<'_> {
    pub fn with_editor(&mut self, editor: &str) -> &mut Self {
        alter_settings::<ContentTypePartSettings>(&mut self.record.settings, |s| {
            s.editor = Some(editor.to_string())
        });
        self
    }

    pub fn with_display_name(&mut self, display_name: &str) -> &mut Self {
        alter_settings::<ContentTypePartSettings>(&mut self.record.settings, |s| {
            s.display_name = Some(display_name.to_string())
        });
        self
    }

    pub fn with_position(&mut self, position: &str) -> &mut Self {
        alter_settings::<ContentTypePartSettings>(&mut self.record.settings, |s| {
            s.position = Some(position.to_string())
        });
        self
    }

    pub fn with_settings<S: DefinitionSettings>(&mut self, settings: &S) -> &mut Self {
        write_settings(&mut self.record.settings, settings);
        self
    }
}

pub struct ContentPartDefinitionBuilder<'a> {
    record: &'a mut ContentPartDefinition,
}

impl<'a> ContentPartDefinitionBuilder<'a> {
    pub(crate) fn new(record: &'a mut ContentPartDefinition) -> Self {
        Self { record }
    }

    pub fn attachable(&mut self, attachable: bool) -> &mut Self {
        alter_settings::<ContentPartSettings>(&mut self.record.settings, |s| {
            s.attachable = attachable
        });
        self
    }

    pub fn reusable(&mut self, reusable: bool) -> &mut Self {
        alter_settings::<ContentPartSettings>(&mut self.record.settings, |s| s.reusable = reusable);
        self
    }

    pub fn with_description(&mut self, description: &str) -> &mut Self {
        alter_settings::<ContentPartSettings>(&mut self.record.settings, |s| {
            s.description = Some(description.to_string())
        });
        self
    }

    /// Add or edit a field. A new field starts without a field type; set
    /// one with `of_type`.
    pub fn with_field(
        &mut self,
        field_name: &str,
        f: impl FnOnce(&mut ContentPartFieldDefinitionBuilder<'_>),
    ) -> &mut Self {
        let index = match self.record.fields.iter().position(|x| x.name == field_name) {
            Some(index) => index,
            None => {
                self.record.fields.push(ContentPartFieldDefinition {
                    name: field_name.to_string(),
                    field_type: String::new(),
                    settings: SettingsMap::new(),
                });
                self.record.fields.len() - 1
            }
        };
        f(&mut ContentPartFieldDefinitionBuilder {
            record: &mut self.record.fields[index],
        });
        self
    }

    pub fn remove_field(&mut self, field_name: &str) -> &mut Self {
        self.record.fields.retain(|f| f.name != field_name);
        self
    }

    pub fn with_settings<S: DefinitionSettings>(&mut self, settings: &S) -> &mut Self {
        write_settings(&mut self.record.settings, settings);
        self
    }
}

pub struct ContentPartFieldDefinitionBuilder<'a> {
    record: &'a mut ContentPartFieldDefinition,
}

impl ContentPartFieldDefinitionBuilder<'_> {
    pub fn of_type(&mut self, field_type: &str) -> &mut Self {
        self.record.field_type = field_type.to_string();
        self
    }

    pub fn with_display_name(&mut self, display_name: &str) -> &mut Self {
        alter_settings::<ContentPartFieldSettings>(&mut self.record.settings, |s| {
            s.display_name = Some(display_name.to_string())
        });
        self
    }

    pub fn with_position(&mut self, position: &str) -> &mut Self {
        alter_settings::<ContentPartFieldSettings>(&mut self.record.settings, |s| {
            s.position = Some(position.to_string())
        });
        self
    }

    pub fn with_editor(&mut self, editor: &str) -> &mut Self {
        alter_settings::<ContentPartFieldSettings>(&mut self.record.settings, |s| {
            s.editor = Some(editor.to_string())
        });
        self
    }

    pub fn with_settings<S: DefinitionSettings>(&mut self, settings: &S) -> &mut Self {
        write_settings(&mut self.record.settings, settings);
        self
    }
}
