//! UUID-generation node.

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use host::{
    execute_per_item, prepare_output_data, Item, NodeContext, NodeDescriptor, NodeError,
    NodeProperty, OperationError, WorkflowNode,
};

pub const NODE_TYPE: &str = "uuid";

pub struct UuidNode;

#[async_trait]
impl WorkflowNode for UuidNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            display_name: "UUID".to_string(),
            name: NODE_TYPE.to_string(),
            group: vec!["Miscellaneous".to_string()],
            version: 1,
            description: "Generate a UUID per item".to_string(),
            credentials: Vec::new(),
            inputs: vec!["main".to_string()],
            outputs: vec!["main".to_string()],
            properties: vec![NodeProperty::options(
                "UUID Version",
                "version",
                [("v1", "v1"), ("v4", "v4")],
            )
            .default(json!("v4"))
            .description("UUID version to generate")],
        }
    }

    async fn execute(&self, ctx: &dyn NodeContext) -> Result<Vec<Vec<Item>>, OperationError> {
        let items = ctx.input_data().to_vec();
        let continue_on_fail = ctx.continue_on_fail();

        // v1 stamps every UUID of this invocation with the same node id.
        let seed = Uuid::new_v4().into_bytes();
        let node_id = [seed[0], seed[1], seed[2], seed[3], seed[4], seed[5]];

        let output = execute_per_item(ctx.node(), items, continue_on_fail, |mut item, index| {
            async move {
                let version = ctx.string_parameter("version", index, Some("v4"))?;
                let value = match version.as_str() {
                    "v1" => Uuid::now_v1(&node_id),
                    "v4" => Uuid::new_v4(),
                    other => {
                        return Err(NodeError::InvalidParameter {
                            name: "version".to_string(),
                            message: format!("unsupported UUID version '{other}'"),
                        })
                    }
                };
                match &mut item.json {
                    Value::Object(object) => {
                        object.insert("uuid".to_string(), Value::from(value.to_string()));
                    }
                    other => *other = json!({ "uuid": value.to_string() }),
                }
                Ok(item)
            }
        })
        .await?;

        Ok(prepare_output_data(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host::mock::MockContext;
    use serde_json::json;

    #[tokio::test]
    async fn default_version_adds_a_v4_uuid_to_every_item() {
        let ctx = MockContext::new(NODE_TYPE).with_json_items([json!({"id": 1}), json!({"id": 2})]);

        let output = UuidNode.execute(&ctx).await.expect("generation succeeds");
        let port = &output[0];
        assert_eq!(port.len(), 2);
        for (index, item) in port.iter().enumerate() {
            assert_eq!(item.json["id"], json!(index + 1));
            let parsed = Uuid::parse_str(item.json["uuid"].as_str().unwrap()).unwrap();
            assert_eq!(parsed.get_version_num(), 4);
        }
    }

    #[tokio::test]
    async fn version_can_vary_per_item() {
        let ctx = MockContext::new(NODE_TYPE)
            .with_json_items([json!({}), json!({})])
            .with_indexed_parameter("version", 0, json!("v1"))
            .with_indexed_parameter("version", 1, json!("v4"));

        let output = UuidNode.execute(&ctx).await.expect("generation succeeds");
        let port = &output[0];
        let first = Uuid::parse_str(port[0].json["uuid"].as_str().unwrap()).unwrap();
        let second = Uuid::parse_str(port[1].json["uuid"].as_str().unwrap()).unwrap();
        assert_eq!(first.get_version_num(), 1);
        assert_eq!(second.get_version_num(), 4);
    }

    #[tokio::test]
    async fn non_object_payload_is_replaced() {
        let ctx = MockContext::new(NODE_TYPE).with_json_items([json!("scalar")]);

        let output = UuidNode.execute(&ctx).await.expect("generation succeeds");
        let item = &output[0][0];
        assert!(item.json.is_object());
        assert!(item.json["uuid"].is_string());
    }

    #[tokio::test]
    async fn unsupported_version_is_captured_under_continue_on_fail() {
        let ctx = MockContext::new(NODE_TYPE)
            .with_json_items([json!({"id": 1})])
            .with_parameter("version", json!("v9"))
            .with_continue_on_fail(true);

        let output = UuidNode.execute(&ctx).await.expect("captured as data");
        let port = &output[0];
        assert_eq!(port.len(), 2);
        assert_eq!(port[0].json, json!({"id": 1}));
        assert!(port[1].error.as_deref().unwrap().contains("v9"));
        assert_eq!(port[1].paired_item, Some(0));
    }

    #[tokio::test]
    async fn unsupported_version_fails_fast_otherwise() {
        let ctx = MockContext::new(NODE_TYPE)
            .with_json_items([json!({})])
            .with_parameter("version", json!("v9"));

        let error = UuidNode.execute(&ctx).await.expect_err("bad version");
        assert_eq!(error.item_index(), Some(0));
    }
}
