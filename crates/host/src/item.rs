//! The unit of workflow data flowing through a node.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One item of a batch: a JSON payload plus the error annotations a failed
/// operation leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// The payload. Owned by the host; nodes replace it wholesale or merge
    /// fields into it.
    pub json: Value,

    /// Error message set when the operation that produced this item failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Index of the input item this item was derived from.
    #[serde(
        default,
        rename = "pairedItem",
        skip_serializing_if = "Option::is_none"
    )]
    pub paired_item: Option<usize>,
}

impl Item {
    pub fn new(json: Value) -> Self {
        Self {
            json,
            error: None,
            paired_item: None,
        }
    }

    /// Error copy of a failed input item, tagged with its origin position.
    pub fn failed(json: Value, message: impl Into<String>, paired_item: usize) -> Self {
        Self {
            json,
            error: Some(message.into()),
            paired_item: Some(paired_item),
        }
    }
}

impl From<Value> for Item {
    fn from(json: Value) -> Self {
        Self::new(json)
    }
}

/// Wrap raw JSON produced by a driver into items, one per array element.
pub fn return_json_array(value: Value) -> Vec<Item> {
    match value {
        Value::Array(values) => values.into_iter().map(Item::new).collect(),
        Value::Null => Vec::new(),
        other => vec![Item::new(other)],
    }
}

/// Wrap a finished batch into the host's multi-output-port shape.
///
/// Every node in this pack has exactly one output port.
pub fn prepare_output_data(items: Vec<Item>) -> Vec<Vec<Item>> {
    vec![items]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_array_becomes_one_item_per_element() {
        let items = return_json_array(json!([{"a": 1}, {"a": 2}]));
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].json, json!({"a": 2}));
    }

    #[test]
    fn scalar_becomes_a_single_item_and_null_none() {
        assert_eq!(return_json_array(json!({"a": 1})).len(), 1);
        assert!(return_json_array(Value::Null).is_empty());
    }

    #[test]
    fn error_fields_are_omitted_from_clean_items() {
        let clean = serde_json::to_value(Item::new(json!({"id": 1}))).unwrap();
        assert_eq!(clean, json!({"json": {"id": 1}}));

        let failed = serde_json::to_value(Item::failed(json!({"id": 2}), "boom", 1)).unwrap();
        assert_eq!(
            failed,
            json!({"json": {"id": 2}, "error": "boom", "pairedItem": 1})
        );
    }
}
