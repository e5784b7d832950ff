//! Field values stored inside parts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of a taxonomy field: the taxonomy it draws from and the selected
/// terms, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaxonomyField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy_content_item_id: Option<String>,
    pub term_content_item_ids: Vec<String>,
}

impl TaxonomyField {
    pub fn with_terms<I, S>(taxonomy_content_item_id: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taxonomy_content_item_id: Some(taxonomy_content_item_id.into()),
            term_content_item_ids: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Decode a stored field value.
    ///
    /// Only objects are accepted. Any shape mismatch, such as a term list
    /// that is not a list of strings, yields `Err` so the caller can skip the
    /// field.
    pub fn decode(value: &Value) -> Result<Self, serde_json::Error> {
        if !value.is_object() {
            return Err(serde::de::Error::custom(format!(
                "expected an object, found {}",
                json_kind(value)
            )));
        }
        serde_json::from_value(value.clone())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_terms() {
        let field = TaxonomyField::decode(&json!({
            "TaxonomyContentItemId": "tax",
            "TermContentItemIds": ["t1", "t2"]
        }))
        .unwrap();
        assert_eq!(field.term_content_item_ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_decode_missing_terms_is_empty() {
        let field = TaxonomyField::decode(&json!({ "TaxonomyContentItemId": "tax" })).unwrap();
        assert!(field.term_content_item_ids.is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        assert!(TaxonomyField::decode(&json!("t1")).is_err());
        assert!(TaxonomyField::decode(&json!(["t1"])).is_err());
        assert!(TaxonomyField::decode(&json!({ "TermContentItemIds": "t1" })).is_err());
        assert!(TaxonomyField::decode(&json!({ "TermContentItemIds": [1, 2] })).is_err());
    }
}
