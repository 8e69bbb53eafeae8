//! Named layers and stacked views over them.

mod view;

pub use view::ContextView;

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::config::{ContextOptions, EmptySegments};
use crate::path::PathDict;
use crate::traversal::split_path;
use crate::value::{table_factory, Node, NodeFactory, Value};
use crate::Error;

/// Namespaced layers with fallthrough views.
///
/// Layers are created lazily the first time their name is referenced and
/// live as long as the context. Names are unique: including a name twice
/// yields the same layer. Layer names follow path rules, so `"app.local"`
/// nests a namespace.
///
/// ## Example
///
/// ```
/// use pathstack::Context;
///
/// let context = Context::new();
/// let root = context.include(&["root"])?;
/// // Missing segments are created
/// root.set("foo.bar", "baz")?;
///
/// let other = context.include(&["other"])?;
/// other.set("key", "value")?;
///
/// let both = context.include(&["root", "other"])?;
/// assert_eq!(both.get("foo.bar")?.as_str(), Some("baz"));
/// assert_eq!(both.get("key")?.as_str(), Some("value"));
///
/// // Writes only apply to the top-most layer
/// both.set("only.in.other", "both_value")?;
/// assert!(!root.contains("only.in.other"));
/// assert_eq!(other.get("only.in.other")?.as_str(), Some("both_value"));
/// # Ok::<(), pathstack::Error>(())
/// ```
#[derive(Clone)]
pub struct Context {
    inner: Rc<Inner>,
}

struct Inner {
    options: ContextOptions,
    registry: Node,
    layer_factory: NodeFactory,
    node_factory: NodeFactory,
    global: Option<Node>,
}

impl Context {
    /// Creates a context with default options.
    pub fn new() -> Self {
        let options = ContextOptions::default();
        let node_factory = table_factory();
        let layer_factory = path_dict_factory(&options, &node_factory);
        Self {
            inner: Rc::new(Inner {
                registry: registry_for(&options),
                options,
                layer_factory,
                node_factory,
                global: None,
            }),
        }
    }

    /// Creates a new builder for constructing a `Context`.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn options(&self) -> &ContextOptions {
        &self.inner.options
    }

    pub fn separator(&self) -> &str {
        &self.inner.options.path_separator
    }

    /// Factory for empty output nodes, used by snapshots.
    pub fn node_factory(&self) -> &NodeFactory {
        &self.inner.node_factory
    }

    /// The permanent layer under the reserved prefix, if one is configured.
    pub fn global(&self) -> Option<Node> {
        self.inner.global.clone()
    }

    /// Returns the layer named `name`, creating it on first reference.
    pub fn get_context(&self, name: &str) -> Result<Node, Error> {
        self.check_protected(name)?;
        self.resolve_layer(name)
    }

    /// Builds a view stacking the named layers bottom to top, in order.
    ///
    /// With a reserved prefix configured, the global layer sits beneath the
    /// named layers so every view falls through to it. Fails with
    /// [`Error::NoLayers`] if `names` is empty.
    pub fn include(&self, names: &[&str]) -> Result<ContextView, Error> {
        let base = self.inner.global.iter().cloned().collect();
        self.include_onto(base, names)
    }

    pub(crate) fn include_onto(
        &self,
        mut layers: Vec<Node>,
        names: &[&str],
    ) -> Result<ContextView, Error> {
        if names.is_empty() {
            return Err(Error::NoLayers);
        }
        for name in names {
            layers.push(self.get_context(name)?);
        }
        debug!(layers = layers.len(), "built context view");
        ContextView::new(self.clone(), layers)
    }

    fn resolve_layer(&self, name: &str) -> Result<Node, Error> {
        resolve_layer(&self.inner.registry, &self.inner.layer_factory, name)
    }

    /// Fails if the first segment of the layer name `path`, split the way the
    /// registry splits it, is the reserved prefix.
    fn check_protected(&self, path: &str) -> Result<(), Error> {
        let options = &self.inner.options;
        let Some(prefix) = &options.reserved_prefix else {
            return Ok(());
        };
        let segments = split_path(path, &options.path_separator, options.empty_segments);
        if segments.first() == Some(&prefix.as_str()) {
            return Err(Error::ProtectedPath {
                path: path.to_string(),
                prefix: prefix.clone(),
            });
        }
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("options", &self.inner.options)
            .field("layers", &self.inner.registry)
            .finish()
    }
}

fn registry_for(options: &ContextOptions) -> Node {
    Node::new(
        PathDict::new()
            .with_separator(options.path_separator.clone())
            .with_empty_segments(options.empty_segments),
    )
}

fn resolve_layer(registry: &Node, layer_factory: &NodeFactory, name: &str) -> Result<Node, Error> {
    match registry.get(name) {
        Ok(Value::Mapping(layer)) => Ok(layer),
        Ok(Value::Scalar(_)) => Err(Error::type_conflict(name)),
        Err(e) if e.is_missing() => {
            let layer = layer_factory();
            registry.set(name, layer.clone())?;
            debug!(layer = name, "created layer");
            Ok(layer)
        }
        Err(e) => Err(e),
    }
}

fn path_dict_factory(options: &ContextOptions, node_factory: &NodeFactory) -> NodeFactory {
    let separator = options.path_separator.clone();
    let policy = options.empty_segments;
    let node_factory = Rc::clone(node_factory);
    Rc::new(move || {
        Node::new(
            PathDict::new()
                .with_separator(separator.clone())
                .with_empty_segments(policy)
                .with_node_factory(Rc::clone(&node_factory)),
        )
    })
}

/// Builder for constructing a [`Context`].
///
/// ```
/// use pathstack::{Context, EmptySegments};
///
/// let context = Context::builder()
///     .with_separator("/")
///     .with_empty_segments(EmptySegments::Collapse)
///     .with_reserved_prefix("_")
///     .build()?;
///
/// let view = context.include(&["app"])?;
/// view.set("server//host", "localhost")?;
/// assert_eq!(view.get("server/host")?.as_str(), Some("localhost"));
/// # Ok::<(), pathstack::Error>(())
/// ```
#[must_use = "builders do nothing until .build() is called"]
pub struct ContextBuilder {
    options: ContextOptions,
    node_factory: NodeFactory,
    layer_factory: Option<NodeFactory>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            options: ContextOptions::default(),
            node_factory: table_factory(),
            layer_factory: None,
        }
    }
}

impl ContextBuilder {
    /// Replaces all options, e.g. with ones loaded by
    /// [`load_options_file`](crate::config::load_options_file).
    pub fn with_options(mut self, options: ContextOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.options.path_separator = separator.into();
        self
    }

    pub fn with_empty_segments(mut self, policy: EmptySegments) -> Self {
        self.options.empty_segments = policy;
        self
    }

    /// Reserves `prefix` as an internal namespace holding the global layer.
    pub fn with_reserved_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.reserved_prefix = Some(prefix.into());
        self
    }

    /// Sets the factory for intermediate nodes inside layers and for
    /// snapshot output nodes.
    pub fn with_node_factory(mut self, factory: NodeFactory) -> Self {
        self.node_factory = factory;
        self
    }

    /// Sets the factory for layers themselves. Defaults to a [`PathDict`]
    /// using the configured separator and node factory.
    pub fn with_layer_factory(mut self, factory: NodeFactory) -> Self {
        self.layer_factory = Some(factory);
        self
    }

    /// Builds the `Context`.
    ///
    /// Returns an error if the options are self-contradictory.
    pub fn build(self) -> Result<Context, Error> {
        self.options.validate()?;
        let layer_factory = self
            .layer_factory
            .unwrap_or_else(|| path_dict_factory(&self.options, &self.node_factory));
        let registry = registry_for(&self.options);
        let global = match &self.options.reserved_prefix {
            Some(prefix) => {
                let name = format!("{prefix}{}global", self.options.path_separator);
                Some(resolve_layer(&registry, &layer_factory, &name)?)
            }
            None => None,
        };
        Ok(Context {
            inner: Rc::new(Inner {
                options: self.options,
                registry,
                layer_factory,
                node_factory: self.node_factory,
                global,
            }),
        })
    }
}
