pub mod config;
pub mod context;
mod error;
pub mod merge;
mod path;
pub mod traversal;
mod value;

pub use config::{ConfigError, ContextOptions, EmptySegments};
pub use context::{Context, ContextBuilder, ContextView};
pub use error::Error;
pub use merge::merge;
pub use path::PathDict;
pub use value::{table_factory, Mapping, Node, NodeFactory, Scalar, Table, Value};
