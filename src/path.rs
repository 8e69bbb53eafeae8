//! Path-navigable mapping.

use std::fmt;

use crate::config::{EmptySegments, DEFAULT_SEPARATOR};
use crate::traversal::{create_on_missing, raise_on_missing, split_path, traverse};
use crate::value::{table_factory, Mapping, Node, NodeFactory, Table, Value};
use crate::Error;

/// A mapping whose keys may be delimited paths.
///
/// Keys without the separator are stored and looked up atomically. Delimited
/// keys are walked one segment at a time; on `set`, missing intermediate
/// nodes are created with the node factory (empty [`Table`]s by default).
///
/// ```
/// use pathstack::{PathDict, Mapping};
///
/// let mut config = PathDict::new().with_separator("/");
/// config.set("~/ws/pathstack", "Cargo.toml".into())?;
/// config.set("~/ws/bloop", ".gitignore".into())?;
///
/// let ws = config.get("~/ws")?;
/// assert_eq!(ws.as_mapping().map(|n| n.len()), Some(2));
/// # Ok::<(), pathstack::Error>(())
/// ```
pub struct PathDict {
    data: Node,
    separator: String,
    factory: NodeFactory,
    empty_segments: EmptySegments,
}

impl PathDict {
    pub fn new() -> Self {
        Self {
            data: Node::new(Table::new()),
            separator: DEFAULT_SEPARATOR.to_string(),
            factory: table_factory(),
            empty_segments: EmptySegments::default(),
        }
    }

    /// Sets the path separator.
    ///
    /// # Panics
    ///
    /// Panics if `separator` is empty.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        self.separator = separator;
        self
    }

    /// Sets the factory used for intermediate nodes created on `set`.
    pub fn with_node_factory(mut self, factory: NodeFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_empty_segments(mut self, policy: EmptySegments) -> Self {
        self.empty_segments = policy;
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Sets every `(path, value)` pair in order, with path semantics.
    pub fn update<I, K, V>(&mut self, entries: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (path, value) in entries {
            self.set(path.as_ref(), value.into())?;
        }
        Ok(())
    }

    /// Returns the container holding the last segment, plus that segment.
    /// `None` means `path` is a direct key of this node.
    fn locate<'p>(&self, path: &'p str, create: bool) -> Result<Option<(Node, &'p str)>, Error> {
        if !path.contains(&self.separator) {
            return Ok(None);
        }
        let segments = split_path(path, &self.separator, self.empty_segments);
        let located = if create {
            traverse(&self.data, &segments, &self.separator, create_on_missing(&self.factory))?
        } else {
            traverse(&self.data, &segments, &self.separator, raise_on_missing(&self.separator))?
        };
        Ok(Some(located))
    }
}

/// A terminal miss names the whole path; any other failure passes through.
fn rename_missing(err: Error, path: &str) -> Error {
    if err.is_missing() {
        Error::missing(path)
    } else {
        err
    }
}

impl Default for PathDict {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapping for PathDict {
    fn get(&self, path: &str) -> Result<Value, Error> {
        match self.locate(path, false)? {
            None => self.data.get(path),
            Some((node, key)) => node.get(key).map_err(|e| rename_missing(e, path)),
        }
    }

    fn set(&mut self, path: &str, value: Value) -> Result<(), Error> {
        match self.locate(path, true)? {
            None => self.data.set(path, value),
            Some((node, key)) => node.set(key, value),
        }
    }

    fn delete(&mut self, path: &str) -> Result<Value, Error> {
        match self.locate(path, false)? {
            None => self.data.delete(path),
            Some((node, key)) => node.delete(key).map_err(|e| rename_missing(e, path)),
        }
    }

    fn keys(&self) -> Vec<String> {
        self.data.keys()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

impl From<PathDict> for Value {
    fn from(dict: PathDict) -> Self {
        Value::Mapping(Node::new(dict))
    }
}

impl fmt::Debug for PathDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathDict")
            .field("separator", &self.separator)
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn mapping(value: Value) -> Node {
        value.as_mapping().cloned().unwrap()
    }

    #[test]
    fn test_get_missing() {
        let d = PathDict::new();
        assert!(matches!(d.get("foo"), Err(Error::MissingKey { path }) if path == "foo"));
    }

    #[test]
    fn test_get_missing_path_names_prefix_reached() {
        let mut d = PathDict::new();
        assert!(matches!(d.get("foo.bar.baz"), Err(Error::MissingKey { path }) if path == "foo"));

        d.set("foo.bar.other", 1.into()).unwrap();
        assert!(matches!(
            d.get("foo.bar.baz"),
            Err(Error::MissingKey { path }) if path == "foo.bar.baz"
        ));
    }

    #[test]
    fn test_set_direct() {
        let mut d = PathDict::new();
        d.set("foo", "bar".into()).unwrap();
        assert_eq!(d.get("foo").unwrap().as_str(), Some("bar"));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_set_path_missing() {
        let mut d = PathDict::new();
        d.set("foo.bar.baz", "blah".into()).unwrap();

        let foo = mapping(d.get("foo").unwrap());
        let bar = mapping(foo.get("bar").unwrap());
        assert_eq!(bar.get("baz").unwrap().as_str(), Some("blah"));
        assert_eq!(d.get("foo.bar.baz").unwrap().as_str(), Some("blah"));
        assert_eq!(d.keys(), vec!["foo".to_string()]);
    }

    #[test]
    fn test_type_conflict_is_distinct() {
        let mut d = PathDict::new();
        d.set("a", "scalar".into()).unwrap();

        assert!(matches!(d.get("a.b"), Err(Error::TypeConflict { path }) if path == "a"));
        assert!(matches!(d.set("a.b.c", 1.into()), Err(Error::TypeConflict { .. })));
        assert!(matches!(d.delete("a.b"), Err(Error::TypeConflict { .. })));
    }

    #[test]
    fn test_nested_store_errors_pass_through() {
        let inner = Node::new(PathDict::new().with_separator("/"));
        inner.set("a", 1).unwrap();
        let mut outer = PathDict::new();
        outer.set("inner", inner.into()).unwrap();

        assert!(matches!(outer.get("inner.a/b"), Err(Error::TypeConflict { path }) if path == "a"));
        assert!(matches!(outer.delete("inner.a/b"), Err(Error::TypeConflict { .. })));
        assert!(matches!(
            outer.get("inner.b/c"),
            Err(Error::MissingKey { path }) if path == "inner.b/c"
        ));
        assert_eq!(outer.get("inner.a").unwrap().as_integer(), Some(1));
    }

    #[test]
    fn test_delete_does_not_prune() {
        let mut d = PathDict::new();
        d.set("a.b.c", 1.into()).unwrap();

        assert_eq!(d.delete("a.b.c").unwrap().as_integer(), Some(1));
        assert!(!d.contains("a.b.c"));
        assert!(mapping(d.get("a.b").unwrap()).is_empty());

        assert!(matches!(d.delete("a.b.c"), Err(Error::MissingKey { path }) if path == "a.b.c"));
        assert!(matches!(d.delete("nope"), Err(Error::MissingKey { path }) if path == "nope"));
    }

    #[test]
    fn test_mapping_round_trip_keeps_identity() {
        let mut d = PathDict::new();
        let node = Node::new(Table::new());
        d.set("k", node.clone().into()).unwrap();

        assert!(mapping(d.get("k").unwrap()).ptr_eq(&node));
    }

    #[test]
    fn test_custom_node_factory() {
        let factory: NodeFactory =
            std::rc::Rc::new(|| Node::new(std::collections::HashMap::<String, Value>::new()));
        let mut d = PathDict::new().with_node_factory(factory);
        d.set("a.b", 1.into()).unwrap();

        let a = mapping(d.get("a").unwrap());
        assert!(format!("{a:?}").starts_with('{'));
        assert_eq!(a.get("b").unwrap().as_integer(), Some(1));
    }

    #[test]
    fn test_update_uses_paths() {
        let mut d = PathDict::new().with_separator("/");
        d.update([("a/b", 1), ("a/c", 2), ("d", 3)]).unwrap();

        assert_eq!(d.len(), 2);
        assert_eq!(mapping(d.get("a").unwrap()).len(), 2);
    }

    #[rstest]
    #[case::preserve(EmptySegments::Preserve, "", "a.b.c")]
    #[case::collapse(EmptySegments::Collapse, "b", "a.x.c")]
    fn test_empty_segments(
        #[case] policy: EmptySegments,
        #[case] child: &str,
        #[case] missing: &str,
    ) {
        let mut d = PathDict::new().with_empty_segments(policy);
        d.set("a..b.c", "3 deep".into()).unwrap();

        let a = mapping(d.get("a").unwrap());
        assert_eq!(a.len(), 1);
        assert!(a.contains(child));
        assert_eq!(d.get("a..b.c").unwrap().as_str(), Some("3 deep"));
        assert!(d.get(missing).unwrap_err().is_missing());
    }
}
