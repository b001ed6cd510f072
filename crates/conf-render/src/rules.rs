//! Pattern-backed render rules
//!
//! A scheme output block carries classification entries consulted read-only
//! by the formatters: `attribute` (render a key as an XML attribute, under a
//! new name), `hidden` (flatten a tree level away), `text` (never
//! auto-type), `csv` (split on commas into an array), and `element` (force
//! an XML element even when an attribute rule also matches).
//!
//! Key patterns live in the entry values and may contain wildcards, so each
//! classification is a [`PatternIndex`] queried with the leaf's full dotted
//! name. The attribute rule is keyed differently: the segment before the
//! terminal `attribute` names the key to rename, the value holds the
//! attribute name.

use conf_engine::PatternIndex;
use conf_model::{NameSegment, QualifiedName, SchemeKind, SchemeNode};

/// Read-only key classifications for one output.
#[derive(Default)]
pub struct RenderRules {
    attributes: PatternIndex<String>,
    hidden: PatternIndex<()>,
    text: PatternIndex<()>,
    csv: PatternIndex<()>,
    element: PatternIndex<()>,
}

impl RenderRules {
    /// Collect the classification entries under one scheme output branch.
    ///
    /// Duplicate patterns keep the first registration, matching the pattern
    /// index's ambiguity policy.
    pub fn from_output(output: &SchemeNode) -> Self {
        let mut rules = Self::default();
        collect(output, None, &mut rules);
        rules
    }

    /// The attribute name a leaf segment should be rendered under, if an
    /// attribute rule matches and no element rule overrides it for the
    /// leaf's full name.
    pub fn attribute_name(&self, name: &QualifiedName, segment: &str) -> Option<&str> {
        if self.element.matches(name) {
            return None;
        }
        let key = QualifiedName::new(vec![NameSegment::literal(segment)]);
        self.attributes.lookup(&key).map(String::as_str)
    }

    /// True when this tree level is flattened away.
    pub fn is_hidden(&self, name: &QualifiedName) -> bool {
        self.hidden.matches(name)
    }

    /// True when the value must stay a string, never auto-typed.
    pub fn is_text(&self, name: &QualifiedName) -> bool {
        self.text.matches(name)
    }

    /// True when the value splits on commas into an array.
    pub fn is_csv(&self, name: &QualifiedName) -> bool {
        self.csv.matches(name)
    }
}

fn collect(node: &SchemeNode, parent_segment: Option<&str>, rules: &mut RenderRules) {
    match node {
        SchemeNode::Branch { segment, children } => {
            for child in children {
                collect(child, Some(segment), rules);
            }
        }
        SchemeNode::Entry { kind, text, .. } => {
            let result = match kind {
                SchemeKind::Attribute => {
                    let Some(key) = parent_segment else {
                        return;
                    };
                    let pattern = QualifiedName::new(vec![NameSegment::parse(key)]);
                    rules.attributes.insert(pattern, text.clone())
                }
                SchemeKind::Hidden => rules.hidden.insert_pattern(pattern_of(text)),
                SchemeKind::Text => rules.text.insert_pattern(pattern_of(text)),
                SchemeKind::Csv => rules.csv.insert_pattern(pattern_of(text)),
                SchemeKind::Element => rules.element.insert_pattern(pattern_of(text)),
                SchemeKind::Output | SchemeKind::Format | SchemeKind::Prefix => Ok(()),
            };
            if result.is_err() {
                tracing::warn!(kind = kind.as_str(), pattern = %text, "duplicate render rule");
            }
        }
        SchemeNode::Error { .. } => {}
    }
}

fn pattern_of(text: &str) -> QualifiedName {
    QualifiedName::from_dotted(text)
}
