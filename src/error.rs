use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error type for the pathstack library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The path, or the prefix of it that was reached, is absent.
    #[error("missing key: {path}")]
    MissingKey { path: String },

    /// Traversal tried to descend through a value that is not a mapping.
    #[error("cannot descend through non-mapping value at '{path}'")]
    TypeConflict { path: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("path '{path}' is under the reserved prefix '{prefix}'")]
    ProtectedPath { path: String, prefix: String },

    #[error("a view requires at least one layer")]
    NoLayers,

    #[error("failed to deserialize snapshot: {0}")]
    Deserialize(toml::de::Error),
}

impl Error {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        Error::MissingKey { path: path.into() }
    }

    pub(crate) fn type_conflict(path: impl Into<String>) -> Self {
        Error::TypeConflict { path: path.into() }
    }

    /// Returns `true` for [`Error::MissingKey`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Error::MissingKey { .. })
    }
}
