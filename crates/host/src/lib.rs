//! `host` crate — the host-facing plugin contract.
//!
//! Everything a connector node sees of the workflow host lives here: the item
//! data model, the [`NodeContext`] supplied per invocation, the
//! [`WorkflowNode`] trait every node implements, the declarative schema types
//! the host UI consumes, and the per-item batch executor shared by all node
//! implementations.

pub mod context;
pub mod error;
pub mod executor;
pub mod item;
pub mod mock;
pub mod node;
pub mod schema;

pub use context::{NodeContext, NodeIdentity};
pub use error::{NodeError, OperationError};
pub use executor::execute_per_item;
pub use item::{prepare_output_data, return_json_array, Item};
pub use node::WorkflowNode;
pub use schema::{
    CredentialDescriptor, CredentialRef, DisplayOptions, NodeDescriptor, NodeProperty,
    PropertyKind, PropertyOption,
};
