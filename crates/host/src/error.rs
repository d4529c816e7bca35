//! Node-level error types.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::context::NodeIdentity;

/// Failure raised while processing a single item.
///
/// The executor decides what happens next: under continue-on-fail the error
/// becomes an annotated item, otherwise it is attributed to the node and
/// re-raised as an [`OperationError`].
#[derive(Debug, Error)]
pub enum NodeError {
    /// A required parameter is absent and no default was supplied.
    #[error("parameter '{0}' is missing")]
    MissingParameter(String),

    /// A parameter is present but has the wrong shape.
    #[error("parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// A JSON-typed parameter failed to parse. Surfaces before any SDK or
    /// driver call is attempted.
    #[error("parameter '{name}' is not valid JSON: {source}")]
    InvalidJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The credential set requested by the node is not configured.
    #[error("credentials '{0}' are not configured")]
    MissingCredentials(String),

    /// The wrapped SDK or driver call failed.
    #[error("{0}")]
    Operation(String),

    /// A nested failure that already carries structured context.
    #[error("{message}")]
    Contextual {
        message: String,
        context: Map<String, Value>,
    },
}

impl NodeError {
    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation(message.into())
    }

    pub fn contextual(message: impl Into<String>, context: Map<String, Value>) -> Self {
        Self::Contextual {
            message: message.into(),
            context,
        }
    }
}

/// Fatal error leaving a node: attributed to the failing node instance and,
/// when raised from inside the batch loop, carrying the failing item's
/// position under `itemIndex` in its context.
#[derive(Debug, Error)]
#[error("node '{node}' failed: {message}")]
pub struct OperationError {
    pub node: String,
    pub message: String,
    pub context: Map<String, Value>,
}

impl OperationError {
    /// Batch-level failure raised outside the per-item loop (no `itemIndex`).
    pub fn new(node: &NodeIdentity, error: NodeError) -> Self {
        let (message, context) = match error {
            NodeError::Contextual { message, context } => (message, context),
            other => (other.to_string(), Map::new()),
        };
        Self {
            node: node.name.clone(),
            message,
            context,
        }
    }

    /// Annotate a per-item failure with the position it occurred at.
    ///
    /// An error that already carries context keeps it; `itemIndex` is only
    /// inserted when absent, never overwritten.
    pub fn attach(node: &NodeIdentity, error: NodeError, item_index: usize) -> Self {
        let mut wrapped = Self::new(node, error);
        wrapped
            .context
            .entry("itemIndex".to_string())
            .or_insert_with(|| Value::from(item_index));
        wrapped
    }

    /// The failing item's position, when this error was raised from the loop.
    pub fn item_index(&self) -> Option<usize> {
        self.context
            .get("itemIndex")
            .and_then(Value::as_u64)
            .map(|index| index as usize)
    }
}
