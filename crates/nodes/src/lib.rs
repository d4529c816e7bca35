//! `nodes` crate — the built-in connector node implementations.
//!
//! Every node implements [`host::WorkflowNode`] and funnels its per-item work
//! through [`host::execute_per_item`], so batch ordering and error capture
//! behave identically across the pack.

pub mod okta;
pub mod registry;
pub mod sqlite;
pub mod uuid;

pub use registry::{builtin_registry, NodeRegistry};
