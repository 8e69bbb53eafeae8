//! Context options: defaults, validation and loading from TOML.

mod error;
mod file;
mod options;

pub use error::ConfigError;
pub use file::load_options_file;
pub use options::{ContextOptions, EmptySegments, DEFAULT_SEPARATOR};
