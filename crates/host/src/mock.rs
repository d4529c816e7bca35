//! `MockContext` — a test double for `NodeContext`.
//!
//! Useful in unit and integration tests where a real workflow host is either
//! unavailable or irrelevant.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::context::{NodeContext, NodeIdentity};
use crate::error::NodeError;
use crate::item::Item;

/// An in-memory context for exercising nodes without a workflow host.
pub struct MockContext {
    node: NodeIdentity,
    items: Vec<Item>,
    parameters: HashMap<String, Value>,
    /// Per-index overrides, standing in for host expression resolution.
    indexed_parameters: HashMap<(String, usize), Value>,
    credentials: HashMap<String, Map<String, Value>>,
    continue_on_fail: bool,
}

impl MockContext {
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            node: NodeIdentity::new(format!("test {kind} node"), kind),
            items: Vec::new(),
            parameters: HashMap::new(),
            indexed_parameters: HashMap::new(),
            credentials: HashMap::new(),
            continue_on_fail: false,
        }
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    pub fn with_json_items(mut self, payloads: impl IntoIterator<Item = Value>) -> Self {
        self.items = payloads.into_iter().map(Item::new).collect();
        self
    }

    /// Set a parameter resolving to the same value for every item.
    pub fn with_parameter(mut self, name: &str, value: Value) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    /// Set a parameter value for one specific item index only.
    pub fn with_indexed_parameter(mut self, name: &str, index: usize, value: Value) -> Self {
        self.indexed_parameters
            .insert((name.to_string(), index), value);
        self
    }

    pub fn with_credentials(mut self, name: &str, values: Map<String, Value>) -> Self {
        self.credentials.insert(name.to_string(), values);
        self
    }

    pub fn with_continue_on_fail(mut self, value: bool) -> Self {
        self.continue_on_fail = value;
        self
    }
}

#[async_trait]
impl NodeContext for MockContext {
    fn input_data(&self) -> &[Item] {
        &self.items
    }

    fn parameter(&self, name: &str, index: usize) -> Option<Value> {
        self.indexed_parameters
            .get(&(name.to_string(), index))
            .or_else(|| self.parameters.get(name))
            .cloned()
    }

    async fn credentials(&self, name: &str) -> Result<Map<String, Value>, NodeError> {
        self.credentials
            .get(name)
            .cloned()
            .ok_or_else(|| NodeError::MissingCredentials(name.to_string()))
    }

    fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }

    fn node(&self) -> &NodeIdentity {
        &self.node
    }
}
