//! Content definition store.

use super::builder::{ContentPartDefinitionBuilder, ContentTypeDefinitionBuilder, TypeRecord};
use super::model::{ContentPartDefinition, ContentTypeDefinition, ContentTypePartDefinition};
use super::ContentDefinitionManager;
use crate::persist::{read_document, write_document};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DefinitionsDocument {
    #[serde(default)]
    types: BTreeMap<String, TypeRecord>,
    #[serde(default)]
    parts: BTreeMap<String, ContentPartDefinition>,
}

impl DefinitionsDocument {
    fn resolve_type(&self, record: &TypeRecord) -> ContentTypeDefinition {
        let parts = record
            .parts
            .iter()
            .map(|type_part| ContentTypePartDefinition {
                name: type_part.name.clone(),
                part_definition: self
                    .parts
                    .get(&type_part.part_name)
                    .cloned()
                    .unwrap_or_else(|| ContentPartDefinition::empty(&type_part.part_name)),
                settings: type_part.settings.clone(),
            })
            .collect();

        ContentTypeDefinition {
            name: record.name.clone(),
            display_name: record.display_name.clone(),
            parts,
            settings: record.settings.clone(),
        }
    }
}

/// Content definitions held in memory, optionally backed by a JSON document.
///
/// Every `alter_*` call rewrites the document when a path is configured.
#[derive(Debug)]
pub struct ContentDefinitionStore {
    path: Option<PathBuf>,
    document: RwLock<DefinitionsDocument>,
}

impl ContentDefinitionStore {
    /// Create a store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            document: RwLock::new(DefinitionsDocument::default()),
        }
    }

    /// Open a store backed by `path`, loading it if it exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = read_document::<DefinitionsDocument>(&path)?.unwrap_or_default();
        debug!(
            "Loaded {} content types from {}",
            document.types.len(),
            path.display()
        );
        Ok(Self {
            path: Some(path),
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read(&self) -> RwLockReadGuard<'_, DefinitionsDocument> {
        match self.document.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, DefinitionsDocument> {
        match self.document.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Apply `f` to a copy of the document, persist the copy, then make it
    /// current. A failed write leaves the live document untouched.
    fn commit<R>(&self, f: impl FnOnce(&mut DefinitionsDocument) -> R) -> Result<R> {
        let mut current = self.write();
        let mut next = current.clone();
        let result = f(&mut next);
        if let Some(path) = &self.path {
            write_document(path, &next)?;
        }
        *current = next;
        Ok(result)
    }

    /// Create or edit a content type.
    pub fn alter_type_definition(
        &self,
        name: &str,
        f: impl FnOnce(&mut ContentTypeDefinitionBuilder<'_>),
    ) -> Result<()> {
        self.commit(|document| {
            let record = document
                .types
                .entry(name.to_string())
                .or_insert_with(|| TypeRecord::new(name));
            f(&mut ContentTypeDefinitionBuilder::new(record));
        })?;
        debug!("Altered content type {}", name);
        Ok(())
    }

    /// Create or edit a content part.
    pub fn alter_part_definition(
        &self,
        name: &str,
        f: impl FnOnce(&mut ContentPartDefinitionBuilder<'_>),
    ) -> Result<()> {
        self.commit(|document| {
            let record = document
                .parts
                .entry(name.to_string())
                .or_insert_with(|| ContentPartDefinition::empty(name));
            f(&mut ContentPartDefinitionBuilder::new(record));
        })?;
        debug!("Altered content part {}", name);
        Ok(())
    }

    /// Remove a content type. Items of that type are left in place.
    pub fn delete_type_definition(&self, name: &str) -> Result<bool> {
        if !self.read().types.contains_key(name) {
            return Ok(false);
        }
        let removed = self.commit(|document| document.types.remove(name).is_some())?;
        if removed {
            debug!("Deleted content type {}", name);
        }
        Ok(removed)
    }

    pub fn delete_part_definition(&self, name: &str) -> Result<bool> {
        if !self.read().parts.contains_key(name) {
            return Ok(false);
        }
        self.commit(|document| document.parts.remove(name).is_some())
    }
}

impl ContentDefinitionManager for ContentDefinitionStore {
    fn get_type_definition(&self, name: &str) -> Option<ContentTypeDefinition> {
        let document = self.read();
        document
            .types
            .get(name)
            .map(|record| document.resolve_type(record))
    }

    fn get_part_definition(&self, name: &str) -> Option<ContentPartDefinition> {
        self.read().parts.get(name).cloned()
    }

    fn list_type_definitions(&self) -> Vec<ContentTypeDefinition> {
        let document = self.read();
        document
            .types
            .values()
            .map(|record| document.resolve_type(record))
            .collect()
    }
}
