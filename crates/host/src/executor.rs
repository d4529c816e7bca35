//! Per-item batch executor shared by every node implementation.
//!
//! Turns a batch of input items into a batch of output items under the host's
//! continue-on-fail policy:
//! - continue-on-fail: the failing item keeps its pristine copy in place and
//!   an error copy tagged with `pairedItem` is appended after the batch;
//! - fail-fast: the first failure aborts the loop and propagates a single
//!   [`OperationError`] carrying the failing position.

use std::future::Future;

use tracing::warn;

use crate::context::NodeIdentity;
use crate::error::{NodeError, OperationError};
use crate::item::Item;

/// Run `op` once per input item, in strict ascending index order.
///
/// Operations run sequentially — each future is awaited before the next index
/// starts, so later items observe the side effects of earlier ones. On
/// success the returned item replaces the input at the same position.
pub async fn execute_per_item<F, Fut>(
    node: &NodeIdentity,
    mut items: Vec<Item>,
    continue_on_fail: bool,
    mut op: F,
) -> Result<Vec<Item>, OperationError>
where
    F: FnMut(Item, usize) -> Fut,
    Fut: Future<Output = Result<Item, NodeError>>,
{
    // Error copies pushed below must never be processed themselves.
    let input_len = items.len();

    for index in 0..input_len {
        match op(items[index].clone(), index).await {
            Ok(output) => items[index] = output,
            Err(error) if continue_on_fail => {
                warn!("node '{}' item {index} failed: {error}", node.name);
                let message = error.to_string();
                items.push(Item::failed(items[index].json.clone(), message, index));
            }
            Err(error) => return Err(OperationError::attach(node, error, index)),
        }
    }

    Ok(items)
}
