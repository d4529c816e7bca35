//! Registry mapping node type names to implementations.

use std::collections::HashMap;
use std::sync::Arc;

use host::WorkflowNode;

use crate::okta::OktaNode;
use crate::sqlite::SqliteNode;
use crate::uuid::UuidNode;

pub type NodeRegistry = HashMap<String, Arc<dyn WorkflowNode>>;

/// All built-in nodes, keyed by their registered type name.
pub fn builtin_registry() -> NodeRegistry {
    let nodes: [Arc<dyn WorkflowNode>; 3] =
        [Arc::new(OktaNode), Arc::new(SqliteNode), Arc::new(UuidNode)];
    nodes
        .into_iter()
        .map(|node| (node.descriptor().name, node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_every_builtin_node() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), 3);
        for name in ["oktaAdmin", "sqlite", "uuid"] {
            let node = registry.get(name).expect("registered node");
            assert_eq!(node.descriptor().name, name);
        }
    }

    #[test]
    fn descriptors_serialize_in_host_schema_shape() {
        let descriptor = crate::sqlite::SqliteNode.descriptor();
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["name"], "sqlite");
        assert_eq!(value["inputs"], serde_json::json!(["main"]));
        // Conditional visibility serializes under displayOptions.show.
        let db_file = &value["properties"][1];
        assert_eq!(db_file["name"], "dbFile");
        assert_eq!(
            db_file["displayOptions"]["show"]["dbType"],
            serde_json::json!(["file"])
        );

        let credential = crate::okta::okta_credentials();
        let value = serde_json::to_value(&credential).unwrap();
        assert_eq!(value["name"], "oktaCredentialsApi");
        assert_eq!(value["properties"][1]["password"], true);
    }
}
