//! `flowpack` CLI entry-point.
//!
//! A thin stand-in for a workflow host, useful for exercising nodes from the
//! command line:
//! - `list`     — show the registered node types.
//! - `describe` — print a node's schema as JSON.
//! - `run`      — execute a node against items/parameters/credentials files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::debug;

use host::{Item, NodeContext, NodeError, NodeIdentity};
use nodes::builtin_registry;

#[derive(Parser)]
#[command(name = "flowpack", about = "Connector node pack for workflow hosts", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the registered node types.
    List,
    /// Print a node's schema as JSON.
    Describe {
        /// Registered node type name.
        node: String,
    },
    /// Execute one node invocation and print the output ports.
    Run {
        /// Registered node type name.
        node: String,
        /// JSON file holding an array of input payloads.
        #[arg(long)]
        items: Option<PathBuf>,
        /// JSON file mapping parameter names to values.
        #[arg(long)]
        params: Option<PathBuf>,
        /// JSON file mapping credential names to credential objects.
        #[arg(long)]
        credentials: Option<PathBuf>,
        /// Capture per-item failures as data instead of aborting.
        #[arg(long)]
        continue_on_fail: bool,
    },
}

/// File-backed `NodeContext`: parameters resolve to the same value for every
/// item (no expression engine outside a real host).
struct FileContext {
    node: NodeIdentity,
    items: Vec<Item>,
    parameters: Map<String, Value>,
    credentials: Map<String, Value>,
    continue_on_fail: bool,
}

#[async_trait]
impl NodeContext for FileContext {
    fn input_data(&self) -> &[Item] {
        &self.items
    }

    fn parameter(&self, name: &str, _index: usize) -> Option<Value> {
        self.parameters.get(name).cloned()
    }

    async fn credentials(&self, name: &str) -> Result<Map<String, Value>, NodeError> {
        match self.credentials.get(name) {
            Some(Value::Object(values)) => Ok(values.clone()),
            _ => Err(NodeError::MissingCredentials(name.to_string())),
        }
    }

    fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }

    fn node(&self) -> &NodeIdentity {
        &self.node
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let registry = builtin_registry();

    match cli.command {
        Command::List => {
            let mut names: Vec<_> = registry.values().map(|node| node.descriptor()).collect();
            names.sort_by(|a, b| a.name.cmp(&b.name));
            for descriptor in names {
                println!("{:<12} {}", descriptor.name, descriptor.display_name);
            }
        }

        Command::Describe { node } => {
            let Some(implementation) = registry.get(&node) else {
                bail!("unknown node type '{node}'");
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&implementation.descriptor())?
            );
        }

        Command::Run {
            node,
            items,
            params,
            credentials,
            continue_on_fail,
        } => {
            let Some(implementation) = registry.get(&node) else {
                bail!("unknown node type '{node}'");
            };

            let ctx = FileContext {
                node: NodeIdentity::new(format!("{node} (cli)"), node.clone()),
                items: load_items(items.as_deref())?,
                parameters: load_object(params.as_deref())?,
                credentials: load_object(credentials.as_deref())?,
                continue_on_fail,
            };

            debug!("running '{node}' over {} input items", ctx.items.len());
            match implementation.execute(&ctx).await {
                Ok(output) => {
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                Err(error) => {
                    eprintln!("❌ {error}");
                    if !error.context.is_empty() {
                        eprintln!("   context: {}", serde_json::to_string(&error.context)?);
                    }
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn load_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Input payloads. Defaults to a single empty item so utility nodes can run
/// without an items file.
fn load_items(path: Option<&Path>) -> Result<Vec<Item>> {
    let Some(path) = path else {
        return Ok(vec![Item::new(Value::Object(Map::new()))]);
    };
    match load_json(path)? {
        Value::Array(payloads) => Ok(payloads.into_iter().map(Item::new).collect()),
        _ => bail!("{} must hold a JSON array of payloads", path.display()),
    }
}

fn load_object(path: Option<&Path>) -> Result<Map<String, Value>> {
    let Some(path) = path else {
        return Ok(Map::new());
    };
    match load_json(path)? {
        Value::Object(values) => Ok(values),
        _ => bail!("{} must hold a JSON object", path.display()),
    }
}
