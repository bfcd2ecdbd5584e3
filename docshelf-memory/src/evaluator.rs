//! Criterion evaluation for in-memory document lookups.
//!
//! A document matches a lookup when the field named by the query key matches at least one
//! criterion. Literal criteria compare the field's text exactly. Pattern criteria are
//! compiled with the `regex` crate; the JavaScript-style flags `i`, `m` and `s` are honoured
//! and any other flag is ignored.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use docshelf_core::{
    error::{ShelfError, ShelfResult},
    query::{FindQuery, MatchValue},
};

/// A compiled criterion.
#[derive(Debug)]
pub(crate) enum Matcher {
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    pub fn compile(value: &MatchValue) -> ShelfResult<Self> {
        match value {
            MatchValue::Literal(literal) => Ok(Matcher::Literal(literal.clone())),
            MatchValue::Pattern { source, flags } => RegexBuilder::new(source)
                .case_insensitive(flags.contains('i'))
                .multi_line(flags.contains('m'))
                .dot_matches_new_line(flags.contains('s'))
                .build()
                .map(Matcher::Pattern)
                .map_err(|e| ShelfError::InvalidPattern(e.to_string())),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Literal(literal) => literal == text,
            Matcher::Pattern(regex) => regex.is_match(text),
        }
    }
}

/// Evaluates a [`FindQuery`] against stored documents.
#[derive(Debug)]
pub(crate) struct DocumentEvaluator {
    key: String,
    matchers: Vec<Matcher>,
}

impl DocumentEvaluator {
    pub fn new(query: &FindQuery) -> ShelfResult<Self> {
        Ok(Self {
            key: query.key.clone(),
            matchers: query
                .values
                .iter()
                .map(Matcher::compile)
                .collect::<ShelfResult<Vec<_>>>()?,
        })
    }

    pub fn evaluate(&self, document: &Value) -> bool {
        let Some(text) = field_text(document, &self.key) else {
            return false;
        };

        self.matchers
            .iter()
            .any(|matcher| matcher.matches(&text))
    }

    /// Returns the ids of the matching documents, in storage order.
    pub fn filter_documents<'a>(
        &self,
        documents: impl IntoIterator<Item = (&'a String, &'a Value)>,
    ) -> Vec<String> {
        documents
            .into_iter()
            .filter(|(_, doc)| self.evaluate(doc))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Text of a scalar field, looked up by a dot-separated path.
fn field_text(document: &Value, key: &str) -> Option<String> {
    let value = key
        .split('.')
        .try_fold(document, |current, segment| current.get(segment))?;

    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
