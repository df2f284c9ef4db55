use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "Invalid id {value:?}: ids must be a single path segment (no '/', '\\\\', NUL, '.' or '..')"
)]
pub struct IdError {
    value: String,
}

/// Opaque identifier for users, portfolios, investments and the rest.
///
/// The JSON file backend uses ids as directory names, so anything coming from
/// user input should go through [`Id::from_string_checked`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Id {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap a string without validating it.
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Wrap a string, rejecting values that are not a safe path segment.
    pub fn from_string_checked(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if Self::is_path_safe(&value) {
            Ok(Self(value))
        } else {
            Err(IdError { value })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_path_safe(value: &str) -> bool {
        if value.is_empty() || value == "." || value == ".." {
            return false;
        }
        !value.chars().any(|c| c == '/' || c == '\\' || c == '\0')
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique_and_path_safe() {
        let first = Id::new();
        let second = Id::new();
        assert_ne!(first, second);
        assert!(Id::is_path_safe(first.as_str()));
    }

    #[test]
    fn from_string_keeps_value() {
        let id = Id::from_string("portfolio-123");
        assert_eq!(id.as_str(), "portfolio-123");
        assert_eq!(id.to_string(), "portfolio-123");
    }

    #[test]
    fn from_string_checked_rejects_unsafe_values() {
        assert!(Id::from_string_checked("../escape").is_err());
        assert!(Id::from_string_checked("..").is_err());
        assert!(Id::from_string_checked(".").is_err());
        assert!(Id::from_string_checked("").is_err());
        assert!(Id::from_string_checked("foo/bar").is_err());
        assert!(Id::from_string_checked("foo\\bar").is_err());
        assert!(Id::from_string_checked("bad\0id").is_err());
        assert!(Id::from_string_checked("AAPL-lot-1").is_ok());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = Id::from_string("inv-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""inv-1""#);
    }
}
