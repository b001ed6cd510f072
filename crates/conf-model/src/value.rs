//! Value tokens and values
//!
//! A value is an ordered sequence of literal runs, standalone `*` wildcards,
//! and `${name}` references. Adjacent literal tokens may always be merged;
//! the merge is idempotent.

use crate::name::QualifiedName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single token inside a value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueToken {
    /// A run of literal text
    Literal(String),
    /// A standalone `*` placeholder
    Wildcard,
    /// A `${name}` cross-reference, inlined textually during resolution
    Reference(QualifiedName),
}

/// An ordered sequence of value tokens
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value {
    tokens: Vec<ValueToken>,
}

impl Value {
    pub fn new(tokens: Vec<ValueToken>) -> Self {
        Self { tokens }.concat_literals()
    }

    /// A value holding a single literal.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            tokens: vec![ValueToken::Literal(text.into())],
        }
    }

    pub fn tokens(&self) -> &[ValueToken] {
        &self.tokens
    }

    /// Count of standalone wildcard tokens.
    pub fn wildcard_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, ValueToken::Wildcard))
            .count()
    }

    /// Count of wildcards embedded in reference names.
    pub fn reference_wildcard_count(&self) -> usize {
        self.references().map(QualifiedName::wildcard_count).sum()
    }

    /// Total value arity: standalone wildcards plus reference-embedded ones.
    pub fn arity(&self) -> usize {
        self.wildcard_count() + self.reference_wildcard_count()
    }

    pub fn references(&self) -> impl Iterator<Item = &QualifiedName> {
        self.tokens.iter().filter_map(|t| match t {
            ValueToken::Reference(name) => Some(name),
            _ => None,
        })
    }

    /// True if the value contains no wildcard and no reference.
    pub fn is_text_only(&self) -> bool {
        self.tokens
            .iter()
            .all(|t| matches!(t, ValueToken::Literal(_)))
    }

    /// The rendered text if the value is text-only.
    pub fn as_text(&self) -> Option<String> {
        if self.is_text_only() {
            Some(self.to_string())
        } else {
            None
        }
    }

    /// Merge adjacent literal tokens. Idempotent.
    pub fn concat_literals(self) -> Self {
        let mut merged: Vec<ValueToken> = Vec::with_capacity(self.tokens.len());
        for token in self.tokens {
            match (merged.last_mut(), token) {
                (Some(ValueToken::Literal(prev)), ValueToken::Literal(next)) => {
                    prev.push_str(&next);
                }
                (_, token) => merged.push(token),
            }
        }
        Self { tokens: merged }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                ValueToken::Literal(text) => f.write_str(text)?,
                ValueToken::Wildcard => f.write_str("*")?,
                ValueToken::Reference(name) => write!(f, "${{{name}}}")?,
            }
        }
        Ok(())
    }
}
