//! Deterministic deep merge of stacked trees.
//!
//! For layers `[bottom, ..., top]`, the top-most layer that defines a key
//! decides whether that key is a scalar or a mapping:
//!
//! - scalar: the top-most value is used as is, and nothing below it is read;
//! - mapping: every layer whose value for the key is also a mapping is merged
//!   key by key with the same rule. Non-mapping values for that key are
//!   pruned, since there is no way to combine them.
//!
//! ```text
//! [{"key": "bottom"},        {"key": {"m": "top"}}]      -> {"m": "top"}
//! [{"key": {"m": "bottom"}}, {"key": "top"}]             -> "top"
//! [{"key": {"a": 1, "c": 1}}, {"key": "s"}, {"key": {"c": 2, "b": 2}}]
//!                                                        -> {"a": 1, "c": 2, "b": 2}
//! ```
//!
//! Resolution uses an explicit stack of pending tasks instead of recursion, so
//! deep trees do not grow the call stack. The output shares no mapping nodes
//! with the inputs; scalars are shared by reference.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::trace;

use crate::value::{Node, NodeFactory, Value};
use crate::Error;

/// Where a resolved value is written.
enum Slot {
    Root,
    Entry(Node),
}

struct Task {
    containers: Rc<[Node]>,
    key: String,
    output: Slot,
}

/// Merges the value at `path` across `layers` (bottom to top).
///
/// Fails with [`Error::MissingKey`] if no layer defines `path`.
pub fn merge(factory: &NodeFactory, layers: &[Node], path: &str) -> Result<Value, Error> {
    let mut root = None;
    let mut resolved = 0usize;
    let mut pending = vec![Task {
        containers: layers.into(),
        key: path.to_string(),
        output: Slot::Root,
    }];

    while let Some(task) = pending.pop() {
        resolved += 1;
        if let Some(value) = resolve(factory, task.containers, &task.key, &mut pending) {
            match task.output {
                Slot::Root => root = Some(value),
                Slot::Entry(node) => node.set(&task.key, value)?,
            }
        }
    }

    trace!(path, tasks = resolved, "merge resolved");
    root.ok_or_else(|| Error::missing(path))
}

/// Resolves one key, pushing a task for every child key of a merged mapping.
fn resolve(
    factory: &NodeFactory,
    containers: Rc<[Node]>,
    key: &str,
    pending: &mut Vec<Task>,
) -> Option<Value> {
    let values: Vec<Value> = containers
        .iter()
        .filter_map(|container| container.get(key).ok())
        .collect();

    let top = values.last()?;
    if !top.is_mapping() {
        return Some(top.clone());
    }

    let mappings: Rc<[Node]> = values
        .iter()
        .filter_map(|value| value.as_mapping().cloned())
        .collect();
    let output = factory();

    let mut seen = HashSet::new();
    for mapping in mappings.iter() {
        for child in mapping.keys() {
            if seen.insert(child.clone()) {
                pending.push(Task {
                    containers: Rc::clone(&mappings),
                    key: child,
                    output: Slot::Entry(output.clone()),
                });
            }
        }
    }

    Some(Value::Mapping(output))
}
