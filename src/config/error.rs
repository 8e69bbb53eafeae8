use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required options file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read options file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse options file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to deserialize options: {0}")]
    DeserializeError(#[from] toml::de::Error),

    #[error("path separator must not be empty")]
    EmptySeparator,

    #[error("reserved prefix must not be empty")]
    EmptyReservedPrefix,

    #[error("reserved prefix '{prefix}' cannot contain the path separator '{separator}'")]
    PrefixContainsSeparator { prefix: String, separator: String },
}
