//! Name tokens, segments, and qualified names
//!
//! A qualified name is a dot-separated sequence of segments; each segment is
//! a sequence of literal runs and `*` wildcards. Equality and hashing are
//! structural (token positions and literal text), so qualified names can be
//! used as map keys before resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single token inside a name segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameToken {
    /// A run of literal text
    Literal(String),
    /// The `*` placeholder
    Wildcard,
}

/// One dot-delimited segment of a qualified name.
///
/// Adjacent literal tokens are merged on construction, so two segments built
/// from different literal splits of the same text compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameSegment {
    tokens: Vec<NameToken>,
}

impl NameSegment {
    /// Create a text-only segment.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            tokens: vec![NameToken::Literal(text.into())],
        }
    }

    /// Create a segment holding a single wildcard.
    pub fn wildcard() -> Self {
        Self {
            tokens: vec![NameToken::Wildcard],
        }
    }

    /// Build a segment from tokens, merging adjacent literals.
    pub fn from_tokens(tokens: Vec<NameToken>) -> Self {
        let mut merged: Vec<NameToken> = Vec::with_capacity(tokens.len());
        for token in tokens {
            match (merged.last_mut(), token) {
                (Some(NameToken::Literal(prev)), NameToken::Literal(next)) => {
                    prev.push_str(&next);
                }
                (_, token) => merged.push(token),
            }
        }
        Self { tokens: merged }
    }

    /// Parse a segment from text, treating each `*` as a wildcard.
    pub fn parse(text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut current = String::new();
        for ch in text.chars() {
            if ch == '*' {
                if !current.is_empty() {
                    tokens.push(NameToken::Literal(std::mem::take(&mut current)));
                }
                tokens.push(NameToken::Wildcard);
            } else {
                current.push(ch);
            }
        }
        if !current.is_empty() {
            tokens.push(NameToken::Literal(current));
        }
        Self::from_tokens(tokens)
    }

    pub fn tokens(&self) -> &[NameToken] {
        &self.tokens
    }

    /// True if the segment contains no wildcard.
    pub fn is_text_only(&self) -> bool {
        self.tokens
            .iter()
            .all(|t| matches!(t, NameToken::Literal(_)))
    }

    pub fn wildcard_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, NameToken::Wildcard))
            .count()
    }

    /// Rendered text of the segment, with `*` for wildcards.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NameSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                NameToken::Literal(text) => f.write_str(text)?,
                NameToken::Wildcard => f.write_str("*")?,
            }
        }
        Ok(())
    }
}

/// A dotted sequence of name segments identifying an entry.
///
/// Invariant: every qualified name has at least one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    segments: Vec<NameSegment>,
}

impl QualifiedName {
    pub fn new(segments: Vec<NameSegment>) -> Self {
        debug_assert!(!segments.is_empty(), "qualified name must have a segment");
        Self { segments }
    }

    /// Parse a dotted name, treating `*` characters as wildcards.
    ///
    /// # Examples
    ///
    /// ```
    /// use conf_model::QualifiedName;
    ///
    /// let name = QualifiedName::from_dotted("server.*.host");
    /// assert_eq!(name.len(), 3);
    /// assert_eq!(name.wildcard_count(), 1);
    /// assert_eq!(name.to_string(), "server.*.host");
    /// ```
    pub fn from_dotted(text: &str) -> Self {
        let segments = text.split('.').map(NameSegment::parse).collect::<Vec<_>>();
        Self::new(segments)
    }

    pub fn segments(&self) -> &[NameSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first(&self) -> &NameSegment {
        &self.segments[0]
    }

    pub fn last(&self) -> &NameSegment {
        &self.segments[self.segments.len() - 1]
    }

    /// True if no segment contains a wildcard.
    pub fn is_text_only(&self) -> bool {
        self.segments.iter().all(NameSegment::is_text_only)
    }

    pub fn wildcard_count(&self) -> usize {
        self.segments.iter().map(NameSegment::wildcard_count).sum()
    }

    /// The name with its first segment removed, or `None` for a
    /// single-segment name.
    pub fn strip_first(&self) -> Option<QualifiedName> {
        if self.segments.len() <= 1 {
            None
        } else {
            Some(Self::new(self.segments[1..].to_vec()))
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
