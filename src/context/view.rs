use std::collections::HashSet;
use std::fmt;

use super::Context;
use crate::merge::merge;
use crate::value::{Node, Value};
use crate::Error;

/// An ordered stack of layers, bottom to top.
///
/// Reads fall through from the top-most layer down; writes and deletes touch
/// only the top-most layer. A view holds shared handles to layers owned by
/// its [`Context`] and never owns layer storage itself.
#[derive(Clone)]
pub struct ContextView {
    context: Context,
    layers: Vec<Node>,
    anchor: Option<String>,
}

impl ContextView {
    /// Creates a view over `layers`. Fails with [`Error::NoLayers`] if empty.
    pub fn new(context: Context, layers: Vec<Node>) -> Result<Self, Error> {
        if layers.is_empty() {
            return Err(Error::NoLayers);
        }
        Ok(Self {
            context,
            layers,
            anchor: None,
        })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// All layers, bottom to top.
    pub fn layers(&self) -> &[Node] {
        &self.layers
    }

    /// The layer that receives writes.
    pub fn top(&self) -> &Node {
        self.layers
            .last()
            .expect("views are never built over an empty stack")
    }

    /// Returns a new view with `names` stacked above the existing layers.
    pub fn include(&self, names: &[&str]) -> Result<ContextView, Error> {
        let mut view = self.context.include_onto(self.layers.clone(), names)?;
        view.anchor = self.anchor.clone();
        Ok(view)
    }

    /// Returns a view of the same layers where every path is relative to
    /// `path`.
    pub fn at(&self, path: &str) -> ContextView {
        Self {
            context: self.context.clone(),
            layers: self.layers.clone(),
            anchor: Some(self.qualify(path)),
        }
    }

    /// Runs `f` with this view for the duration of a scope.
    ///
    /// Leaving the scope releases nothing; layers live as long as the
    /// context and no changes are rolled back.
    pub fn scope<R>(&self, f: impl FnOnce(&ContextView) -> R) -> R {
        f(self)
    }

    /// Returns the value from the top-most layer that defines `path`.
    pub fn get(&self, path: &str) -> Result<Value, Error> {
        let full = self.qualify(path);
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(&full).ok())
            .ok_or_else(|| Error::missing(path))
    }

    /// Writes `value` at `path` in the top-most layer.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<(), Error> {
        self.top().set(&self.qualify(path), value)
    }

    /// Removes `path` from the top-most layer.
    ///
    /// Lower layers are not consulted: deleting a key defined only below the
    /// top fails with [`Error::MissingKey`].
    pub fn delete(&self, path: &str) -> Result<Value, Error> {
        self.top().delete(&self.qualify(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }

    /// Union of direct keys across all layers, each yielded once.
    pub fn keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for root in self.roots() {
            for key in root.keys() {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Deep-merges all layers into a fresh tree.
    ///
    /// Each key is merged independently; see [`merge`](crate::merge::merge)
    /// for how type conflicts between layers are resolved.
    pub fn snapshot(&self) -> Result<Node, Error> {
        let factory = self.context.node_factory();
        let roots = self.roots();
        let output = factory();
        for key in self.keys() {
            let merged = merge(factory, &roots, &key)?;
            output.set(&key, merged)?;
        }
        Ok(output)
    }

    /// The node each layer holds at the anchor, bottom to top. Layers where
    /// the anchor is absent or not a mapping are skipped.
    fn roots(&self) -> Vec<Node> {
        match &self.anchor {
            None => self.layers.clone(),
            Some(anchor) => self
                .layers
                .iter()
                .filter_map(|layer| match layer.get(anchor) {
                    Ok(Value::Mapping(node)) => Some(node),
                    _ => None,
                })
                .collect(),
        }
    }

    fn qualify(&self, path: &str) -> String {
        match &self.anchor {
            None => path.to_string(),
            Some(anchor) => format!("{anchor}{}{path}", self.context.separator()),
        }
    }
}

impl fmt::Debug for ContextView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextView")
            .field("layers", &self.layers)
            .field("anchor", &self.anchor)
            .finish()
    }
}
