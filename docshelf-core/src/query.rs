//! Match criteria for document lookups.
//!
//! A lookup names a field key and a list of criteria. Each criterion is either a literal
//! string or a pattern, and the distinction is kept in [`MatchValue`] until the request is
//! serialized. On the wire a criterion is a single string tagged by prefix:
//!
//! - `str:<literal>` for an exact string match
//! - `regex:/<source>/<flags>` for a pattern match
//!
//! ```ignore
//! use docshelf::query::{FindQuery, MatchValue};
//!
//! let query = FindQuery::new("item")
//!     .value("x")
//!     .value(MatchValue::pattern("^y"));
//!
//! assert_eq!(
//!     serde_json::to_value(&query)?,
//!     serde_json::json!({ "key": "item", "values": ["str:x", "regex:/^y/"] }),
//! );
//! ```
//!
//! How criteria are combined, and which regex dialect applies, is up to the backend.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use crate::error::ShelfError;

const LITERAL_TAG: &str = "str:";
const PATTERN_TAG: &str = "regex:";

/// A single match criterion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchValue {
    /// Matches a field whose value equals this string.
    Literal(String),
    /// Matches a field whose value matches this pattern.
    Pattern { source: String, flags: String },
}

impl MatchValue {
    pub fn literal(value: impl Into<String>) -> Self {
        MatchValue::Literal(value.into())
    }

    pub fn pattern(source: impl Into<String>) -> Self {
        MatchValue::Pattern { source: source.into(), flags: String::new() }
    }

    pub fn pattern_with_flags(source: impl Into<String>, flags: impl Into<String>) -> Self {
        MatchValue::Pattern { source: source.into(), flags: flags.into() }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, MatchValue::Pattern { .. })
    }
}

impl fmt::Display for MatchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchValue::Literal(value) => write!(f, "{LITERAL_TAG}{value}"),
            MatchValue::Pattern { source, flags } => write!(f, "{PATTERN_TAG}/{source}/{flags}"),
        }
    }
}

impl FromStr for MatchValue {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(value) = s.strip_prefix(LITERAL_TAG) {
            return Ok(MatchValue::Literal(value.to_string()));
        }

        let Some(pattern) = s.strip_prefix(PATTERN_TAG) else {
            return Err(ShelfError::InvalidPattern(format!("missing criterion tag in '{s}'")));
        };

        // `/source/flags`; the source may itself contain slashes
        let body = pattern
            .strip_prefix('/')
            .ok_or_else(|| ShelfError::InvalidPattern(format!("expected '/' in '{pattern}'")))?;
        let end = body
            .rfind('/')
            .ok_or_else(|| ShelfError::InvalidPattern(format!("unterminated pattern '{pattern}'")))?;

        Ok(MatchValue::Pattern {
            source: body[..end].to_string(),
            flags: body[end + 1..].to_string(),
        })
    }
}

impl From<&str> for MatchValue {
    fn from(value: &str) -> Self {
        MatchValue::Literal(value.to_string())
    }
}

impl From<String> for MatchValue {
    fn from(value: String) -> Self {
        MatchValue::Literal(value)
    }
}

impl From<&Regex> for MatchValue {
    fn from(value: &Regex) -> Self {
        MatchValue::pattern(value.as_str())
    }
}

impl From<Regex> for MatchValue {
    fn from(value: Regex) -> Self {
        MatchValue::from(&value)
    }
}

impl Serialize for MatchValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MatchValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The body of a `findOneDocument` / `findManyDocuments` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindQuery {
    pub key: String,
    pub values: Vec<MatchValue>,
}

impl FindQuery {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), values: Vec::new() }
    }

    pub fn value(mut self, value: impl Into<MatchValue>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<MatchValue>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn criteria_are_tagged_on_the_wire() {
        let query = FindQuery::new("item")
            .value("x")
            .value(&Regex::new("^y").unwrap());

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({ "key": "item", "values": ["str:x", "regex:/^y/"] })
        );
    }

    #[test]
    fn tags_survive_a_round_trip() {
        let values = vec![
            MatchValue::literal("regex:/not-a-pattern/"),
            MatchValue::pattern_with_flags("a/b", "i"),
            MatchValue::literal(""),
        ];

        let wire = serde_json::to_string(&values).unwrap();
        let back: Vec<MatchValue> = serde_json::from_str(&wire).unwrap();

        assert_eq!(back, values);
        assert!(!back[0].is_pattern());
        assert!(back[1].is_pattern());
    }

    #[test]
    fn untagged_strings_are_rejected() {
        assert!(matches!(
            "plain".parse::<MatchValue>(),
            Err(ShelfError::InvalidPattern(_))
        ));
        assert!("regex:^y".parse::<MatchValue>().is_err());
    }
}
