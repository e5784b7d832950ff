//! Layer storage and the homepage layer bootstrap.

use super::model::{Condition, Layer, LayersDocument, Rule, UniqueId};
use crate::config::SeedConfig;
use crate::content::generate_id;
use crate::persist::{read_document, write_document};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Load and save the layers document.
pub trait LayerService: Send + Sync {
    fn load_layers(&self) -> Result<LayersDocument>;

    fn update(&self, document: LayersDocument) -> Result<()>;
}

/// Layers document kept in memory, optionally backed by a JSON file.
#[derive(Debug)]
pub struct LayerStore {
    path: Option<PathBuf>,
    document: Mutex<LayersDocument>,
}

impl LayerStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            document: Mutex::new(LayersDocument::default()),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = read_document::<LayersDocument>(&path)?.unwrap_or_default();
        Ok(Self {
            path: Some(path),
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, LayersDocument> {
        match self.document.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LayerService for LayerStore {
    fn load_layers(&self) -> Result<LayersDocument> {
        Ok(self.lock().clone())
    }

    fn update(&self, document: LayersDocument) -> Result<()> {
        let mut current = self.lock();
        if let Some(path) = &self.path {
            write_document(path, &document)?;
        }
        debug!("Updated layers document ({} layers)", document.layers.len());
        *current = document;
        Ok(())
    }
}

/// Assigns identifiers to rules and conditions.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConditionIdGenerator;

impl ConditionIdGenerator {
    /// Give `target` a fresh identifier unless it already has one.
    pub fn generate_unique_id<T: UniqueId>(&self, target: &mut T) {
        if target.unique_id().is_empty() {
            target.set_unique_id(generate_id());
        }
    }
}

/// Add the `Homepage` layer, shown only on the homepage, if no layer of that
/// name exists. Returns whether the layer was created.
pub fn create_homepage_layer_if_not_exist(
    layers: &dyn LayerService,
    ids: &ConditionIdGenerator,
) -> Result<bool> {
    let mut document = layers.load_layers()?;
    if document.find(SeedConfig::HOMEPAGE_LAYER_NAME).is_some() {
        return Ok(false);
    }

    let mut condition = Condition::homepage(true);
    ids.generate_unique_id(&mut condition);

    let mut rule = Rule {
        condition_id: String::new(),
        conditions: vec![condition],
    };
    ids.generate_unique_id(&mut rule);

    document.layers.push(Layer {
        name: SeedConfig::HOMEPAGE_LAYER_NAME.to_string(),
        description: SeedConfig::HOMEPAGE_LAYER_DESCRIPTION.to_string(),
        layer_rule: Some(rule),
    });
    layers.update(document)?;

    info!("Created {} layer", SeedConfig::HOMEPAGE_LAYER_NAME);
    Ok(true)
}
