//! Segment-by-segment descent through nested mappings.
//!
//! [`traverse`] walks every segment but the last and hands back the final
//! container together with the unconsumed last segment. The caller performs
//! the terminal get, set or delete, so one routine serves all three.

use crate::config::EmptySegments;
use crate::value::{Node, NodeFactory, Value};
use crate::Error;

/// Splits `path` on `separator` according to `policy`.
///
/// Always returns at least one segment. Under [`EmptySegments::Collapse`] a
/// path made only of separators becomes the single key `""`.
pub fn split_path<'p>(path: &'p str, separator: &str, policy: EmptySegments) -> Vec<&'p str> {
    let segments: Vec<&str> = match policy {
        EmptySegments::Preserve => path.split(separator).collect(),
        EmptySegments::Collapse => path.split(separator).filter(|s| !s.is_empty()).collect(),
    };
    if segments.is_empty() {
        vec![""]
    } else {
        segments
    }
}

/// Descends `root` along all of `segments` except the last.
///
/// When a segment is absent, `on_missing(node, segment, visited)` is called
/// with `visited` ending in the missing segment. It either fails, or returns a
/// new node that is inserted at `segment` before descent continues. A present
/// child that is not a mapping fails with [`Error::TypeConflict`] naming the
/// path reached.
///
/// `segments` is expected to come from [`split_path`], which never returns an
/// empty list. An empty slice fails with [`Error::MissingKey`] for the empty
/// path and `on_missing` is never called.
pub fn traverse<'p, F>(
    root: &Node,
    segments: &[&'p str],
    separator: &str,
    mut on_missing: F,
) -> Result<(Node, &'p str), Error>
where
    F: FnMut(&Node, &str, &[&str]) -> Result<Node, Error>,
{
    let (last, intermediate) = segments.split_last().ok_or_else(|| Error::missing(""))?;

    let mut visited: Vec<&str> = Vec::with_capacity(intermediate.len());
    let mut node = root.clone();
    for &segment in intermediate {
        visited.push(segment);
        let child = match node.get(segment) {
            Ok(Value::Mapping(child)) => child,
            Ok(Value::Scalar(_)) => return Err(Error::type_conflict(visited.join(separator))),
            Err(e) if e.is_missing() => {
                let created = on_missing(&node, segment, &visited)?;
                node.set(segment, Value::Mapping(created.clone()))?;
                created
            }
            Err(e) => return Err(e),
        };
        node = child;
    }
    Ok((node, *last))
}

/// `on_missing` handler that fails with the full path of the missing segment.
pub fn raise_on_missing(
    separator: &str,
) -> impl Fn(&Node, &str, &[&str]) -> Result<Node, Error> + '_ {
    move |_, _, visited| Err(Error::missing(visited.join(separator)))
}

/// `on_missing` handler that fills gaps with nodes from `factory`.
pub fn create_on_missing(
    factory: &NodeFactory,
) -> impl Fn(&Node, &str, &[&str]) -> Result<Node, Error> + '_ {
    move |_, _, _| Ok(factory())
}
