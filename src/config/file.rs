//! File-based context options.

use std::path::Path;

use tracing::debug;

use super::{ConfigError, ContextOptions};

/// Loads and validates [`ContextOptions`] from a TOML file.
///
/// If `required` is true a missing file is an error; otherwise a missing
/// file yields the default options.
pub fn load_options_file(
    path: impl AsRef<Path>,
    required: bool,
) -> Result<ContextOptions, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let options: ContextOptions =
                toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            options.validate()?;
            debug!(path = %path.display(), "loaded context options");
            Ok(options)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(ContextOptions::default())
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmptySegments;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_loads_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "path_separator = \"/\"").unwrap();
        writeln!(file, "empty_segments = \"collapse\"").unwrap();

        let options = load_options_file(file.path(), true).unwrap();

        assert_eq!(options.path_separator, "/");
        assert_eq!(options.empty_segments, EmptySegments::Collapse);
        assert_eq!(options.reserved_prefix, None);
    }

    #[test]
    fn test_required_missing() {
        let result = load_options_file("/nonexistent/path/options.toml", true);
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_optional_missing() {
        let options = load_options_file("/nonexistent/path/options.toml", false).unwrap();
        assert_eq!(options, ContextOptions::default());
    }

    #[test]
    fn test_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "path_separator = ").unwrap();

        let result = load_options_file(file.path(), true);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_invalid_combination_in_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "path_separator = \".\"").unwrap();
        writeln!(file, "reserved_prefix = \"_._\"").unwrap();

        let result = load_options_file(file.path(), true);
        assert!(matches!(
            result,
            Err(ConfigError::PrefixContainsSeparator { .. })
        ));
    }
}
