//! Configuration build errors
//!
//! Extraction itself never fails: non-matches degrade to `null`. Everything
//! that can go wrong is caught while turning configuration text into a
//! [`ConfigNode`](crate::config::ConfigNode) tree.

use std::fmt;

/// Location of a node inside a configuration tree, e.g. `union[2].properties.title`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPath {
    segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

impl ConfigPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a named child (mapping key)
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Path of a sequence element
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Errors raised while building a configuration tree.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration text: {source}")]
    Syntax {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path}: expected a mapping, found {found}")]
    NotAMapping { path: ConfigPath, found: &'static str },

    #[error("{path}: unknown key `{key}`")]
    UnknownKey { path: ConfigPath, key: String },

    #[error("{path}: `{exclusive}` must be the only key, found `{sibling}` next to it")]
    ExclusiveKey {
        path: ConfigPath,
        exclusive: &'static str,
        sibling: String,
    },

    #[error("{path}: `union` must be a non-empty list of configurations")]
    InvalidUnion { path: ConfigPath },

    #[error("{path}: `properties` must be a mapping of names to configurations")]
    PropertiesNotMapping { path: ConfigPath },

    #[error("{path}: `selector` must be a string")]
    SelectorNotString { path: ConfigPath },

    #[error("{path}: invalid selector `{selector}`: {message}")]
    InvalidSelector {
        path: ConfigPath,
        selector: String,
        message: String,
    },

    #[error("{path}: `transform` must be a string or a non-empty list of strings")]
    InvalidTransformList { path: ConfigPath },

    #[error("{path}: malformed transform `{text}`, expected `name` or `name(arg, ...)`")]
    MalformedTransform { path: ConfigPath, text: String },

    #[error("{path}: unknown transform `{name}`")]
    UnknownTransform { path: ConfigPath, name: String },

    #[error("{path}: invalid arguments for transform `{name}`: {message}")]
    InvalidTransformArgs {
        path: ConfigPath,
        name: String,
        message: String,
    },

    #[error("{path}: `transform` cannot be combined with `properties`")]
    TransformWithProperties { path: ConfigPath },

    #[error("{path}: constant cannot be represented as a value: {message}")]
    InvalidConstant { path: ConfigPath, message: String },

    #[error("{path}: configuration nested deeper than {max_depth} levels")]
    TooDeep { path: ConfigPath, max_depth: usize },
}

impl ConfigError {
    /// Where in the configuration the error was found, if known
    pub fn path(&self) -> Option<&ConfigPath> {
        match self {
            ConfigError::Syntax { .. } => None,
            ConfigError::NotAMapping { path, .. }
            | ConfigError::UnknownKey { path, .. }
            | ConfigError::ExclusiveKey { path, .. }
            | ConfigError::InvalidUnion { path }
            | ConfigError::PropertiesNotMapping { path }
            | ConfigError::SelectorNotString { path }
            | ConfigError::InvalidSelector { path, .. }
            | ConfigError::InvalidTransformList { path }
            | ConfigError::MalformedTransform { path, .. }
            | ConfigError::UnknownTransform { path, .. }
            | ConfigError::InvalidTransformArgs { path, .. }
            | ConfigError::TransformWithProperties { path }
            | ConfigError::InvalidConstant { path, .. }
            | ConfigError::TooDeep { path, .. } => Some(path),
        }
    }
}

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        assert_eq!(ConfigPath::root().to_string(), "<root>");

        let path = ConfigPath::root()
            .key("union")
            .index(3)
            .key("properties")
            .key("foo");
        assert_eq!(path.to_string(), "union[3].properties.foo");
    }

    #[test]
    fn test_error_message_includes_path() {
        let err = ConfigError::UnknownTransform {
            path: ConfigPath::root().key("transform").index(1),
            name: "uppercase".to_string(),
        };
        assert_eq!(err.to_string(), "transform[1]: unknown transform `uppercase`");
        assert!(err.path().is_some());
    }
}
