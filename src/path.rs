use std::fmt;
use std::str::FromStr;

use crate::errors::{JsonPathError, Result};

/// A validated JSONPath string.
///
/// Construction only checks the root marker; full syntax checking happens in
/// the tokenizer. Two paths are equal iff their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonPath(String);

impl JsonPath {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.trim_start().starts_with('$') {
            Ok(Self(path))
        } else {
            Err(JsonPathError::InvalidPath(format!(
                "path must start with `$`, got `{path}`"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for JsonPath {
    type Err = JsonPathError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_root_and_rejects_everything_else() {
        assert!(JsonPath::new("$.a.b").is_ok());
        assert!(JsonPath::new("  $[0]").is_ok());
        assert!(JsonPath::new("a.b").is_err());
        assert!(JsonPath::new("").is_err());
    }

    #[test]
    fn equality_is_string_equality() {
        assert_eq!(JsonPath::new("$.a").unwrap(), "$.a".parse().unwrap());
        assert_ne!(
            JsonPath::new("$.a").unwrap(),
            JsonPath::new("$['a']").unwrap()
        );
    }
}
