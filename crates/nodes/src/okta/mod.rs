//! Okta administration node.
//!
//! Maps host parameters onto Okta Users API calls, one call per input item.

pub mod client;

use async_trait::async_trait;
use serde_json::json;

use host::{
    execute_per_item, prepare_output_data, CredentialDescriptor, CredentialRef, Item, NodeContext,
    NodeDescriptor, NodeError, NodeProperty, OperationError, WorkflowNode,
};

use client::OktaClient;

pub const NODE_TYPE: &str = "oktaAdmin";
pub const CREDENTIALS_NAME: &str = "oktaCredentialsApi";

pub struct OktaNode;

#[async_trait]
impl WorkflowNode for OktaNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            display_name: "Okta Admin".to_string(),
            name: NODE_TYPE.to_string(),
            group: vec!["Productivity".to_string()],
            version: 1,
            description: "Administer Okta users through the Okta management API".to_string(),
            credentials: vec![CredentialRef {
                name: CREDENTIALS_NAME.to_string(),
                required: true,
            }],
            inputs: vec!["main".to_string()],
            outputs: vec!["main".to_string()],
            properties: vec![
                NodeProperty::options("Resource", "resource", [("User", "user")])
                    .default(json!("user")),
                NodeProperty::options(
                    "Operation",
                    "operation",
                    [
                        ("Create", "create"),
                        ("Get", "get"),
                        ("Update", "update"),
                        ("Deactivate", "deactivate"),
                        ("Get All", "getAll"),
                        ("Search", "search"),
                    ],
                )
                .default(json!("get"))
                .required(),
                NodeProperty::string("User ID", "userId")
                    .description("ID or login of the user to operate on")
                    .required()
                    .show_when("operation", ["get", "update", "deactivate"]),
                NodeProperty::json("Profile", "profile")
                    .description("User profile as a JSON object")
                    .required()
                    .show_when("operation", ["create", "update"]),
                NodeProperty::boolean("Activate", "activate")
                    .default(json!(true))
                    .show_when("operation", ["create"]),
                NodeProperty::string("Search Query", "query")
                    .description("Okta search expression, e.g. profile.lastName eq \"Smith\"")
                    .required()
                    .show_when("operation", ["search"]),
                NodeProperty::number("Page Size", "limit")
                    .default(json!(200))
                    .show_when("operation", ["getAll", "search"]),
            ],
        }
    }

    async fn execute(&self, ctx: &dyn NodeContext) -> Result<Vec<Vec<Item>>, OperationError> {
        let items = ctx.input_data().to_vec();
        let continue_on_fail = ctx.continue_on_fail();

        // One client per invocation; it handles authentication and pooling
        // for every item processed below.
        let credentials = ctx
            .credentials(CREDENTIALS_NAME)
            .await
            .map_err(|error| OperationError::new(ctx.node(), error))?;
        let client = OktaClient::from_credentials(&credentials)
            .map_err(|error| OperationError::new(ctx.node(), error))?;
        let client = &client;

        let output = execute_per_item(ctx.node(), items, continue_on_fail, |item, index| {
            async move { run_operation(client, ctx, item, index).await }
        })
        .await?;

        Ok(prepare_output_data(output))
    }
}

async fn run_operation(
    client: &OktaClient,
    ctx: &dyn NodeContext,
    _item: Item,
    index: usize,
) -> Result<Item, NodeError> {
    let resource = ctx.string_parameter("resource", index, Some("user"))?;
    if resource != "user" {
        return Err(NodeError::InvalidParameter {
            name: "resource".to_string(),
            message: format!("unsupported resource '{resource}'"),
        });
    }

    let operation = ctx.string_parameter("operation", index, None)?;
    match operation.as_str() {
        "create" => {
            let profile = ctx.json_parameter("profile", index)?;
            let activate = ctx.bool_parameter("activate", index, true)?;
            Ok(Item::new(client.create_user(profile, activate).await?))
        }
        "get" => {
            let user_id = ctx.string_parameter("userId", index, None)?;
            Ok(Item::new(client.get_user(&user_id).await?))
        }
        "update" => {
            let user_id = ctx.string_parameter("userId", index, None)?;
            let profile = ctx.json_parameter("profile", index)?;
            Ok(Item::new(client.update_user(&user_id, profile).await?))
        }
        "deactivate" => {
            let user_id = ctx.string_parameter("userId", index, None)?;
            client.deactivate_user(&user_id).await?;
            Ok(Item::new(json!({ "userId": user_id, "deactivated": true })))
        }
        "getAll" => {
            let limit = ctx.u64_parameter("limit", index, 200)?;
            let users = client.list_users(limit).await?;
            Ok(Item::new(json!({ "users": users })))
        }
        "search" => {
            let query = ctx.string_parameter("query", index, None)?;
            let limit = ctx.u64_parameter("limit", index, 200)?;
            let users = client.search_users(&query, limit).await?;
            Ok(Item::new(json!({ "users": users })))
        }
        other => Err(NodeError::InvalidParameter {
            name: "operation".to_string(),
            message: format!("unknown operation '{other}'"),
        }),
    }
}

/// Credential declaration consumed by the host's credential store UI.
pub fn okta_credentials() -> CredentialDescriptor {
    CredentialDescriptor {
        name: CREDENTIALS_NAME.to_string(),
        display_name: "Okta Credentials API".to_string(),
        properties: vec![
            NodeProperty::string("Organization URL", "orgUrl").required(),
            NodeProperty::string("Token", "token")
                .description("Obtained from the Okta developer dashboard")
                .password()
                .required(),
        ],
    }
}
