use serde::Deserialize;

use super::ConfigError;

/// Separator used when no other is configured.
pub const DEFAULT_SEPARATOR: &str = ".";

/// How empty path segments (`"a..b"`) are treated when a path is split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySegments {
    /// `""` is an ordinary key: `"a..b"` addresses `a` -> `""` -> `b`.
    #[default]
    Preserve,
    /// Empty segments are dropped: `"a..b"` addresses `a` -> `b`.
    Collapse,
}

/// Options recognized when constructing a [`Context`](crate::Context).
///
/// All fields have defaults, so an empty TOML document is valid:
///
/// ```toml
/// path_separator = "/"
/// empty_segments = "collapse"
/// reserved_prefix = "_"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextOptions {
    pub path_separator: String,
    pub empty_segments: EmptySegments,
    pub reserved_prefix: Option<String>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            path_separator: DEFAULT_SEPARATOR.to_string(),
            empty_segments: EmptySegments::default(),
            reserved_prefix: None,
        }
    }
}

impl ContextOptions {
    /// Parses options from a TOML document and validates them.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(contents)?;
        options.validate()?;
        Ok(options)
    }

    /// Rejects self-contradictory combinations.
    ///
    /// The separator must be non-empty, and a reserved prefix must be
    /// non-empty and must not contain the separator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path_separator.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }
        if let Some(prefix) = &self.reserved_prefix {
            if prefix.is_empty() {
                return Err(ConfigError::EmptyReservedPrefix);
            }
            if prefix.contains(&self.path_separator) {
                return Err(ConfigError::PrefixContainsSeparator {
                    prefix: prefix.clone(),
                    separator: self.path_separator.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let options = ContextOptions::from_toml_str("").unwrap();
        assert_eq!(options, ContextOptions::default());
        assert_eq!(options.path_separator, ".");
    }

    #[test]
    fn test_all_fields() {
        let options = ContextOptions::from_toml_str(
            r#"
            path_separator = "/"
            empty_segments = "collapse"
            reserved_prefix = "_"
            "#,
        )
        .unwrap();
        assert_eq!(options.path_separator, "/");
        assert_eq!(options.empty_segments, EmptySegments::Collapse);
        assert_eq!(options.reserved_prefix.as_deref(), Some("_"));
    }

    #[test]
    fn test_prefix_containing_separator() {
        let result = ContextOptions::from_toml_str(
            r#"
            path_separator = "!"
            reserved_prefix = "_!_"
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::PrefixContainsSeparator { .. })
        ));
    }

    #[test]
    fn test_empty_separator() {
        let result = ContextOptions::from_toml_str(r#"path_separator = """#);
        assert!(matches!(result, Err(ConfigError::EmptySeparator)));
    }

    #[test]
    fn test_unknown_field() {
        let result = ContextOptions::from_toml_str(r#"separator = "/""#);
        assert!(matches!(result, Err(ConfigError::DeserializeError(_))));
    }
}
