//! Wildcard-aware pattern index
//!
//! A trie keyed by name segment with three lookup tiers per level:
//!
//! 1. exact literal-segment children (hash lookup);
//! 2. decorated segments (literal prefix/suffix around wildcards) tested by
//!    an anchored regex built from the segment tokens;
//! 3. a fallback full-name regex match against the stored wildcard-free
//!    keys, used when the query itself contains wildcards (an authored
//!    pattern matched against other authored patterns).
//!
//! When several decorated patterns match a level, the first-registered one
//! wins. That rule is order-dependent and deliberately preserved.

use crate::error::{Error, Result};
use conf_model::{NameSegment, NameToken, QualifiedName};
use regex::Regex;
use std::collections::HashMap;

/// Build an anchored regex for one decorated segment, with one capture
/// group per wildcard.
pub(crate) fn segment_regex(segment: &NameSegment) -> Regex {
    let mut pattern = String::from("^");
    for token in segment.tokens() {
        match token {
            NameToken::Literal(text) => pattern.push_str(&regex::escape(text)),
            NameToken::Wildcard => pattern.push_str("(.*)"),
        }
    }
    pattern.push('$');
    Regex::new(&pattern).expect("Invalid segment regex")
}

/// Test a (possibly wildcarded) segment against concrete text.
pub(crate) fn segment_matches(pattern: &NameSegment, text: &str) -> bool {
    if pattern.is_text_only() {
        pattern.text() == text
    } else {
        segment_regex(pattern).is_match(text)
    }
}

/// The strings bound by matching a segment against concrete text, one per
/// wildcard in token order. Empty for a text-only segment that matches.
pub(crate) fn segment_captures(pattern: &NameSegment, text: &str) -> Option<Vec<String>> {
    if pattern.is_text_only() {
        return (pattern.text() == text).then(Vec::new);
    }
    let caps = segment_regex(pattern).captures(text)?;
    Some((1..caps.len()).map(|i| caps[i].to_string()).collect())
}

/// Anchored whole-name regex for a wildcarded query. Wildcards never cross
/// segment boundaries.
fn name_regex(name: &QualifiedName) -> Regex {
    let mut pattern = String::from("^");
    for (i, segment) in name.segments().iter().enumerate() {
        if i > 0 {
            pattern.push_str("\\.");
        }
        for token in segment.tokens() {
            match token {
                NameToken::Literal(text) => pattern.push_str(&regex::escape(text)),
                NameToken::Wildcard => pattern.push_str("[^.]*"),
            }
        }
    }
    pattern.push('$');
    Regex::new(&pattern).expect("Invalid name regex")
}

struct DecoratedEdge<V> {
    segment: NameSegment,
    regex: Regex,
    node: TrieNode<V>,
}

struct TrieNode<V> {
    exact: HashMap<String, TrieNode<V>>,
    /// Kept in registration order; first match wins
    decorated: Vec<DecoratedEdge<V>>,
    /// True when a registered pattern ends at this node
    terminal: bool,
    value: Option<V>,
}

impl<V> Default for TrieNode<V> {
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            decorated: Vec::new(),
            terminal: false,
            value: None,
        }
    }
}

/// Index of (possibly wildcarded) qualified names, with optional values.
///
/// Built once, then queried many times; no concurrent mutation is needed or
/// supported.
///
/// # Examples
///
/// ```
/// use conf_engine::PatternIndex;
/// use conf_model::QualifiedName;
///
/// let mut index = PatternIndex::new();
/// index.insert(QualifiedName::from_dotted("server.*.host"), "h").unwrap();
/// assert!(index.matches(&QualifiedName::from_dotted("server.web.host")));
/// assert!(!index.matches(&QualifiedName::from_dotted("server.web.port")));
/// ```
pub struct PatternIndex<V> {
    root: TrieNode<V>,
    /// Wildcard-free keys in registration order, for the fallback tier
    concrete: Vec<QualifiedName>,
}

impl<V> Default for PatternIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PatternIndex<V> {
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
            concrete: Vec::new(),
        }
    }

    /// Register a pattern with an associated value.
    ///
    /// Fails on a duplicate wildcard-free key. Re-registering a decorated
    /// pattern keeps the first value (first-registered wins).
    pub fn insert(&mut self, pattern: QualifiedName, value: V) -> Result<()> {
        self.insert_inner(pattern, Some(value))
    }

    /// Register a pattern without a value (set membership only).
    pub fn insert_pattern(&mut self, pattern: QualifiedName) -> Result<()> {
        self.insert_inner(pattern, None)
    }

    fn insert_inner(&mut self, pattern: QualifiedName, value: Option<V>) -> Result<()> {
        let text_only = pattern.is_text_only();
        let mut node = &mut self.root;
        for segment in pattern.segments() {
            if segment.is_text_only() {
                node = node.exact.entry(segment.text()).or_default();
            } else {
                let pos = match node.decorated.iter().position(|e| e.segment == *segment) {
                    Some(pos) => pos,
                    None => {
                        node.decorated.push(DecoratedEdge {
                            regex: segment_regex(segment),
                            segment: segment.clone(),
                            node: TrieNode::default(),
                        });
                        node.decorated.len() - 1
                    }
                };
                node = &mut node.decorated[pos].node;
            }
        }
        if node.terminal && text_only {
            return Err(Error::DuplicatePattern { name: pattern });
        }
        node.terminal = true;
        if node.value.is_none() {
            node.value = value;
        }
        if text_only {
            self.concrete.push(pattern);
        }
        Ok(())
    }

    /// Test whether a name matches any registered pattern.
    ///
    /// Pure; never fails on well-formed input. A wildcard-free name walks
    /// the trie; a wildcarded name falls back to regex matching against the
    /// stored wildcard-free keys.
    pub fn matches(&self, name: &QualifiedName) -> bool {
        self.find(name).is_some()
    }

    /// The value stored with the first pattern matching `name`, if any.
    pub fn lookup(&self, name: &QualifiedName) -> Option<&V> {
        self.find(name).and_then(|node| node.value.as_ref())
    }

    pub fn len(&self) -> usize {
        self.concrete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concrete.is_empty() && self.root.decorated.is_empty() && self.root.exact.is_empty()
    }

    fn find(&self, name: &QualifiedName) -> Option<&TrieNode<V>> {
        if name.is_text_only() {
            Self::find_concrete(&self.root, name.segments())
        } else {
            let re = name_regex(name);
            let key = self
                .concrete
                .iter()
                .find(|key| re.is_match(&key.to_string()))?;
            Self::find_concrete(&self.root, key.segments())
        }
    }

    fn find_concrete<'a>(
        node: &'a TrieNode<V>,
        segments: &[NameSegment],
    ) -> Option<&'a TrieNode<V>> {
        let Some((first, rest)) = segments.split_first() else {
            return node.terminal.then_some(node);
        };
        let text = first.text();
        if let Some(child) = node.exact.get(&text) {
            if let Some(found) = Self::find_concrete(child, rest) {
                return Some(found);
            }
        }
        for edge in &node.decorated {
            if edge.regex.is_match(&text) {
                if let Some(found) = Self::find_concrete(&edge.node, rest) {
                    return Some(found);
                }
            }
        }
        None
    }
}
