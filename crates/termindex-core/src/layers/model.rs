//! Layers and their display rules.

use serde::{Deserialize, Serialize};

/// Something that carries a generated unique identifier.
pub trait UniqueId {
    fn unique_id(&self) -> &str;
    fn set_unique_id(&mut self, id: String);
}

/// A condition of a layer rule. Conditions are stored, not evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub condition_id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: ConditionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConditionKind {
    /// Matches when the request targets the homepage (`value == true`).
    Homepage { value: bool },
    /// Matches a URL pattern.
    Url { value: String },
    /// Always matches (`value == true`) or never.
    Boolean { value: bool },
}

impl Condition {
    pub fn homepage(value: bool) -> Self {
        Self {
            condition_id: String::new(),
            name: "HomepageCondition".to_string(),
            kind: ConditionKind::Homepage { value },
        }
    }
}

impl UniqueId for Condition {
    fn unique_id(&self) -> &str {
        &self.condition_id
    }

    fn set_unique_id(&mut self, id: String) {
        self.condition_id = id;
    }
}

/// A set of conditions that all must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(default)]
    pub condition_id: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl UniqueId for Rule {
    fn unique_id(&self) -> &str {
        &self.condition_id
    }

    fn set_unique_id(&mut self, id: String) {
        self.condition_id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_rule: Option<Rule>,
}

/// All layers of a site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayersDocument {
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl LayersDocument {
    pub fn find(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_serialization() {
        let mut condition = Condition::homepage(true);
        condition.set_unique_id("c1".into());

        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(
            value,
            json!({
                "conditionId": "c1",
                "name": "HomepageCondition",
                "type": "homepage",
                "value": true
            })
        );

        let back: Condition = serde_json::from_value(value).unwrap();
        assert_eq!(back, condition);
    }
}
