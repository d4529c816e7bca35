//! The execution context a host supplies to a node invocation.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::NodeError;
use crate::item::Item;

/// Identity of a node instance, used for error attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// Instance name as configured in the workflow.
    pub name: String,
    /// Registered node type.
    pub kind: String,
}

impl NodeIdentity {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Host-supplied facilities available to a node during one invocation.
///
/// The host owns parameter resolution and credential storage; nodes consume
/// both through this trait only, which keeps every node runnable against
/// [`crate::mock::MockContext`] without a workflow host.
#[async_trait]
pub trait NodeContext: Send + Sync {
    /// The materialized input batch for this invocation.
    fn input_data(&self) -> &[Item];

    /// Resolve a parameter for the given item index.
    ///
    /// The index matters to hosts that evaluate per-item expressions; a
    /// parameter may resolve to a different value for every item.
    fn parameter(&self, name: &str, index: usize) -> Option<Value>;

    /// Decrypted credential set registered under `name`.
    async fn credentials(&self, name: &str) -> Result<Map<String, Value>, NodeError>;

    /// Whether per-item failures should be captured as data instead of
    /// aborting the batch.
    fn continue_on_fail(&self) -> bool;

    /// Identity of the executing node.
    fn node(&self) -> &NodeIdentity;

    fn string_parameter(
        &self,
        name: &str,
        index: usize,
        default: Option<&str>,
    ) -> Result<String, NodeError> {
        match self.parameter(name, index) {
            Some(Value::String(value)) => Ok(value),
            Some(other) => Err(NodeError::InvalidParameter {
                name: name.to_string(),
                message: format!("expected a string, got {other}"),
            }),
            None => default
                .map(str::to_string)
                .ok_or_else(|| NodeError::MissingParameter(name.to_string())),
        }
    }

    fn bool_parameter(&self, name: &str, index: usize, default: bool) -> Result<bool, NodeError> {
        match self.parameter(name, index) {
            Some(Value::Bool(value)) => Ok(value),
            Some(other) => Err(NodeError::InvalidParameter {
                name: name.to_string(),
                message: format!("expected a boolean, got {other}"),
            }),
            None => Ok(default),
        }
    }

    fn u64_parameter(&self, name: &str, index: usize, default: u64) -> Result<u64, NodeError> {
        match self.parameter(name, index) {
            Some(value) => value.as_u64().ok_or_else(|| NodeError::InvalidParameter {
                name: name.to_string(),
                message: format!("expected a non-negative integer, got {value}"),
            }),
            None => Ok(default),
        }
    }

    /// Parse a JSON-typed string parameter into a value.
    ///
    /// Malformed payloads fail here, before any SDK call is attempted.
    fn json_parameter(&self, name: &str, index: usize) -> Result<Value, NodeError> {
        let raw = self.string_parameter(name, index, None)?;
        serde_json::from_str(&raw).map_err(|source| NodeError::InvalidJson {
            name: name.to_string(),
            source,
        })
    }
}
