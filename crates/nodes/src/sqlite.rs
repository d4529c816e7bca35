//! SQLite statement-execution node.
//!
//! One connection per invocation, opened before the batch loop and released
//! when the last handle drops — on the normal and the fail-fast exit path
//! alike. Statement work runs on the blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row, Statement};
use serde_json::{json, Map, Value};
use tokio::task;
use tracing::debug;

use host::{
    execute_per_item, prepare_output_data, Item, NodeContext, NodeDescriptor, NodeError,
    NodeProperty, OperationError, WorkflowNode,
};

pub const NODE_TYPE: &str = "sqlite";

pub struct SqliteNode;

#[derive(Debug, Clone, Copy)]
enum Command {
    /// Execute without reading rows back; reports the change count.
    Run,
    /// First matching row only.
    Get,
    /// All matching rows, fully materialized.
    All,
}

impl Command {
    fn parse(value: &str) -> Result<Self, NodeError> {
        match value {
            "run" => Ok(Self::Run),
            "get" => Ok(Self::Get),
            "all" => Ok(Self::All),
            other => Err(NodeError::InvalidParameter {
                name: "commandType".to_string(),
                message: format!("unknown command type '{other}'"),
            }),
        }
    }
}

#[async_trait]
impl WorkflowNode for SqliteNode {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            display_name: "SQLite".to_string(),
            name: NODE_TYPE.to_string(),
            group: vec!["Data & Storage".to_string()],
            version: 1,
            description: "Execute SQL statements against a SQLite database".to_string(),
            credentials: Vec::new(),
            inputs: vec!["main".to_string()],
            outputs: vec!["main".to_string()],
            properties: vec![
                NodeProperty::options(
                    "Db Type",
                    "dbType",
                    [("In-Memory", ":memory:"), ("File", "file")],
                )
                .default(json!(":memory:")),
                NodeProperty::string("Db File", "dbFile")
                    .show_when("dbType", ["file"]),
                NodeProperty::options(
                    "Command Type",
                    "commandType",
                    [("Run", "run"), ("Get", "get"), ("All", "all")],
                )
                .default(json!("run"))
                .description("Run executes without returning data, Get returns a single row, All returns every row")
                .required(),
                NodeProperty::string("SQL Statement", "sql")
                    .description("The SQL statement to execute")
                    .required(),
            ],
        }
    }

    async fn execute(&self, ctx: &dyn NodeContext) -> Result<Vec<Vec<Item>>, OperationError> {
        let items = ctx.input_data().to_vec();
        let continue_on_fail = ctx.continue_on_fail();

        let connection =
            open_connection(ctx).map_err(|error| OperationError::new(ctx.node(), error))?;
        let connection = Arc::new(Mutex::new(connection));

        let result = execute_per_item(ctx.node(), items, continue_on_fail, |_item, index| {
            let connection = Arc::clone(&connection);
            async move {
                let command =
                    Command::parse(&ctx.string_parameter("commandType", index, Some("run"))?)?;
                let sql = ctx.string_parameter("sql", index, None)?;
                let value = run_statement(connection, command, sql).await?;
                Ok(Item::new(value))
            }
        })
        .await;

        // Last handle: the database closes here on both exit paths.
        drop(connection);
        Ok(prepare_output_data(result?))
    }
}

/// Connection parameters are batch-level; they resolve once at index 0.
fn open_connection(ctx: &dyn NodeContext) -> Result<Connection, NodeError> {
    let db_type = ctx.string_parameter("dbType", 0, Some(":memory:"))?;
    match db_type.as_str() {
        ":memory:" => Connection::open_in_memory().map_err(driver_error),
        "file" => {
            let db_file = ctx.string_parameter("dbFile", 0, None)?;
            Connection::open(Path::new(&db_file)).map_err(driver_error)
        }
        other => Err(NodeError::InvalidParameter {
            name: "dbType".to_string(),
            message: format!("unknown database type '{other}'"),
        }),
    }
}

/// Offload rusqlite work from the async executor.
async fn run_statement(
    connection: Arc<Mutex<Connection>>,
    command: Command,
    sql: String,
) -> Result<Value, NodeError> {
    debug!("sqlite {command:?}: {sql}");
    task::spawn_blocking(move || {
        let connection = connection
            .lock()
            .map_err(|_| NodeError::operation("sqlite connection lock poisoned"))?;
        match command {
            Command::Run => {
                let changes = connection.execute(&sql, []).map_err(driver_error)?;
                Ok(json!({ "changes": changes }))
            }
            Command::Get => {
                let mut statement = connection.prepare(&sql).map_err(driver_error)?;
                let columns = column_names(&statement);
                let mut rows = statement.query([]).map_err(driver_error)?;
                match rows.next().map_err(driver_error)? {
                    Some(row) => row_to_json(row, &columns).map_err(driver_error),
                    None => Ok(json!({})),
                }
            }
            Command::All => {
                let mut statement = connection.prepare(&sql).map_err(driver_error)?;
                let columns = column_names(&statement);
                let mut rows = statement.query([]).map_err(driver_error)?;
                let mut collected = Vec::new();
                while let Some(row) = rows.next().map_err(driver_error)? {
                    collected.push(row_to_json(row, &columns).map_err(driver_error)?);
                }
                Ok(json!({ "rows": collected }))
            }
        }
    })
    .await
    .map_err(|error| NodeError::operation(format!("sqlite task join error: {error}")))?
}

fn column_names(statement: &Statement<'_>) -> Vec<String> {
    statement
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn row_to_json(row: &Row<'_>, columns: &[String]) -> Result<Value, rusqlite::Error> {
    let mut object = Map::new();
    for (index, name) in columns.iter().enumerate() {
        let value = match row.get_ref(index)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(value) => Value::from(value),
            ValueRef::Real(value) => Value::from(value),
            ValueRef::Text(value) => Value::from(String::from_utf8_lossy(value).into_owned()),
            ValueRef::Blob(value) => Value::Array(value.iter().map(|b| Value::from(*b)).collect()),
        };
        object.insert(name.clone(), value);
    }
    Ok(Value::Object(object))
}

fn driver_error(error: rusqlite::Error) -> NodeError {
    NodeError::operation(format!("sqlite error: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use host::mock::MockContext;
    use serde_json::json;

    #[tokio::test]
    async fn statements_share_one_connection_per_invocation() {
        let ctx = MockContext::new(NODE_TYPE)
            .with_json_items([json!({}), json!({}), json!({})])
            .with_parameter("dbType", json!(":memory:"))
            .with_indexed_parameter("commandType", 0, json!("run"))
            .with_indexed_parameter("sql", 0, json!("CREATE TABLE people (name TEXT, age INTEGER)"))
            .with_indexed_parameter("commandType", 1, json!("run"))
            .with_indexed_parameter(
                "sql",
                1,
                json!("INSERT INTO people VALUES ('ada', 36), ('bob', 41)"),
            )
            .with_indexed_parameter("commandType", 2, json!("all"))
            .with_indexed_parameter("sql", 2, json!("SELECT name, age FROM people ORDER BY name"));

        let output = SqliteNode.execute(&ctx).await.expect("statements succeed");
        let port = &output[0];
        assert_eq!(port[0].json, json!({"changes": 0}));
        assert_eq!(port[1].json, json!({"changes": 2}));
        assert_eq!(
            port[2].json,
            json!({"rows": [{"name": "ada", "age": 36}, {"name": "bob", "age": 41}]})
        );
    }

    #[tokio::test]
    async fn get_returns_first_row_or_empty_object() {
        let ctx = MockContext::new(NODE_TYPE)
            .with_json_items([json!({}), json!({}), json!({})])
            .with_indexed_parameter("sql", 0, json!("CREATE TABLE t (v INTEGER)"))
            .with_indexed_parameter("commandType", 1, json!("get"))
            .with_indexed_parameter("sql", 1, json!("SELECT 1 AS one, 2.5 AS score, NULL AS nothing"))
            .with_indexed_parameter("commandType", 2, json!("get"))
            .with_indexed_parameter("sql", 2, json!("SELECT v FROM t"));

        let output = SqliteNode.execute(&ctx).await.expect("statements succeed");
        let port = &output[0];
        assert_eq!(
            port[1].json,
            json!({"one": 1, "score": 2.5, "nothing": null})
        );
        assert_eq!(port[2].json, json!({}));
    }

    #[tokio::test]
    async fn bad_sql_is_captured_under_continue_on_fail() {
        let ctx = MockContext::new(NODE_TYPE)
            .with_json_items([json!({"step": "bad"}), json!({"step": "good"})])
            .with_continue_on_fail(true)
            .with_indexed_parameter("commandType", 0, json!("all"))
            .with_indexed_parameter("sql", 0, json!("SELECT * FROM no_such_table"))
            .with_indexed_parameter("commandType", 1, json!("run"))
            .with_indexed_parameter("sql", 1, json!("CREATE TABLE t (v INTEGER)"));

        let output = SqliteNode.execute(&ctx).await.expect("captured as data");
        let port = &output[0];
        assert_eq!(port.len(), 3);
        // The failing item stays pristine; the later statement still ran.
        assert_eq!(port[0].json, json!({"step": "bad"}));
        assert_eq!(port[1].json, json!({"changes": 0}));
        assert_eq!(port[2].paired_item, Some(0));
        assert!(port[2].error.as_deref().unwrap().contains("no_such_table"));
    }

    #[tokio::test]
    async fn unknown_command_fails_fast_with_item_index() {
        let ctx = MockContext::new(NODE_TYPE)
            .with_json_items([json!({})])
            .with_parameter("commandType", json!("explode"))
            .with_parameter("sql", json!("SELECT 1"));

        let error = SqliteNode.execute(&ctx).await.expect_err("bad command");
        assert_eq!(error.item_index(), Some(0));
        assert!(error.message.contains("explode"));
    }

    #[tokio::test]
    async fn file_database_persists_across_invocations() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_file = dir.path().join("people.db");
        let db_file = db_file.to_str().expect("utf-8 path");

        let write_ctx = MockContext::new(NODE_TYPE)
            .with_json_items([json!({}), json!({})])
            .with_parameter("dbType", json!("file"))
            .with_parameter("dbFile", json!(db_file))
            .with_indexed_parameter("sql", 0, json!("CREATE TABLE people (name TEXT)"))
            .with_indexed_parameter("sql", 1, json!("INSERT INTO people VALUES ('ada')"));
        SqliteNode
            .execute(&write_ctx)
            .await
            .expect("write invocation succeeds");

        let read_ctx = MockContext::new(NODE_TYPE)
            .with_json_items([json!({})])
            .with_parameter("dbType", json!("file"))
            .with_parameter("dbFile", json!(db_file))
            .with_parameter("commandType", json!("get"))
            .with_parameter("sql", json!("SELECT count(*) AS n FROM people"));
        let output = SqliteNode
            .execute(&read_ctx)
            .await
            .expect("read invocation succeeds");
        assert_eq!(output[0][0].json, json!({"n": 1}));
    }
}
