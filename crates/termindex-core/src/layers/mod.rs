//! Widget layers and their rules.

mod model;
mod service;

pub use model::{Condition, ConditionKind, Layer, LayersDocument, Rule, UniqueId};
pub use service::{
    create_homepage_layer_if_not_exist, ConditionIdGenerator, LayerService, LayerStore,
};
