//! Resolved tree nodes
//!
//! The tree assembler turns the flat resolved entry list into a hierarchy of
//! branches, leaves, and localized error nodes. Error nodes are data, not
//! `Err`: resolution always completes, and each formatter decides whether an
//! error under its addressed subtree fails that one output.

use crate::entry::Definition;
use crate::provenance::Provenance;
use serde::{Deserialize, Serialize};

/// A node of the resolved tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// An inner node grouping entries that share a leading segment
    Branch { segment: String, children: Vec<Node> },
    /// A fully resolved definition
    Leaf {
        segment: String,
        text: String,
        provenance: Provenance,
        comments: Vec<String>,
        /// The definition as it looked before reference inlining
        definition: Definition,
    },
    /// A localized failure: unsupported substitute, missing or cyclic
    /// reference, unrecognized scheme entry kind
    Error {
        segment: String,
        message: String,
        provenance: Provenance,
    },
}

impl Node {
    pub fn segment(&self) -> &str {
        match self {
            Node::Branch { segment, .. }
            | Node::Leaf { segment, .. }
            | Node::Error { segment, .. } => segment,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Branch { children, .. } => children,
            _ => &[],
        }
    }

    /// The minimum provenance among this node and its descendants.
    ///
    /// Drives child ordering: branches are placed where their first entry
    /// occurred in the source, independent of grouping order.
    pub fn min_provenance(&self) -> Option<&Provenance> {
        match self {
            Node::Leaf { provenance, .. } | Node::Error { provenance, .. } => Some(provenance),
            Node::Branch { children, .. } => children.iter().filter_map(Node::min_provenance).min(),
        }
    }

    /// The first error node in this subtree, in tree order.
    pub fn first_error(&self) -> Option<&Node> {
        match self {
            Node::Error { .. } => Some(self),
            Node::Leaf { .. } => None,
            Node::Branch { children, .. } => children.iter().find_map(Node::first_error),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.first_error().is_some()
    }
}
