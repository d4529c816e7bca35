//! The `WorkflowNode` trait — the contract every node must fulfil.

use async_trait::async_trait;

use crate::context::NodeContext;
use crate::error::OperationError;
use crate::item::Item;
use crate::schema::NodeDescriptor;

/// A connector node: a static schema plus one execute entry point.
#[async_trait]
pub trait WorkflowNode: Send + Sync {
    /// Static schema consumed by the host UI and validator. Pure data,
    /// never interpreted at execution time.
    fn descriptor(&self) -> NodeDescriptor;

    /// Run the node once over the context's input batch and return the
    /// output ports (always a single port in this pack).
    async fn execute(&self, ctx: &dyn NodeContext) -> Result<Vec<Vec<Item>>, OperationError>;
}
