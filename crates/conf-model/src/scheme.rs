//! Scheme entries
//!
//! A scheme describes outputs: which profile subtrees to render, in which
//! format, and how the formatters should classify individual keys. Scheme
//! trees share the profile tree shape, but leaves carry a closed entry kind
//! parsed from the terminal name segment.

use crate::provenance::Provenance;
use serde::{Deserialize, Serialize};

/// The closed set of recognized scheme entry kinds.
///
/// Parsed from the terminal segment of a scheme leaf name; unknown segments
/// become error nodes rather than panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeKind {
    /// Declares an output target; the value is a name pattern selecting
    /// profile definitions
    Output,
    /// Output format: `xml`, `json`, `yaml`, `ini`, or `flat`
    Format,
    /// Dotted prefix addressing the profile subtree(s) to render
    Prefix,
    /// Key pattern rendered as an XML attribute; the value is the attribute
    /// name (attribute-key rename)
    Attribute,
    /// Key pattern whose tree level is flattened away
    Hidden,
    /// Key pattern always rendered as a string, never auto-typed
    Text,
    /// Key pattern whose value is split on commas into an array
    Csv,
    /// Key pattern forced to render as an XML element even when an
    /// attribute rule also matches
    Element,
}

impl SchemeKind {
    /// Parse a terminal name segment against the closed kind set.
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "output" => Some(Self::Output),
            "format" => Some(Self::Format),
            "prefix" => Some(Self::Prefix),
            "attribute" => Some(Self::Attribute),
            "hidden" => Some(Self::Hidden),
            "text" => Some(Self::Text),
            "csv" => Some(Self::Csv),
            "element" => Some(Self::Element),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::Format => "format",
            Self::Prefix => "prefix",
            Self::Attribute => "attribute",
            Self::Hidden => "hidden",
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Element => "element",
        }
    }
}

/// A node of a resolved scheme tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemeNode {
    Branch {
        segment: String,
        children: Vec<SchemeNode>,
    },
    /// A recognized scheme entry with its resolved value text
    Entry {
        segment: String,
        kind: SchemeKind,
        text: String,
        provenance: Provenance,
    },
    /// An unparseable entry kind or a resolution failure
    Error {
        segment: String,
        message: String,
        provenance: Provenance,
    },
}

impl SchemeNode {
    pub fn segment(&self) -> &str {
        match self {
            SchemeNode::Branch { segment, .. }
            | SchemeNode::Entry { segment, .. }
            | SchemeNode::Error { segment, .. } => segment,
        }
    }

    pub fn children(&self) -> &[SchemeNode] {
        match self {
            SchemeNode::Branch { children, .. } => children,
            _ => &[],
        }
    }
}
