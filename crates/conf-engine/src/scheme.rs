//! Scheme compilation
//!
//! Schemes are regular entries resolved through the same pipeline, with two
//! differences: expansion runs a single pass against an externally supplied
//! list of concrete profile names (scheme patterns never feed back into
//! themselves), and after assembly each leaf's terminal segment is parsed
//! against the closed [`SchemeKind`] set.

use crate::assemble::assemble;
use crate::expand::expand_single_pass;
use crate::matcher::segment_matches;
use crate::resolve::resolve;
use conf_model::{Entry, Node, QualifiedName, SchemeKind, SchemeNode};

/// A resolved scheme tree, shaped like the profile tree but with typed
/// leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeTree {
    pub roots: Vec<SchemeNode>,
}

impl SchemeTree {
    /// All nodes whose path from a root matches the (possibly wildcarded)
    /// dotted prefix.
    pub fn find(&self, prefix: &QualifiedName) -> Vec<&SchemeNode> {
        let mut frontier: Vec<&SchemeNode> = self.roots.iter().collect();
        for (depth, segment) in prefix.segments().iter().enumerate() {
            if depth > 0 {
                frontier = frontier
                    .into_iter()
                    .flat_map(|node| node.children().iter())
                    .collect();
            }
            frontier.retain(|node| segment_matches(segment, node.segment()));
        }
        frontier
    }

    /// The resolved texts of every entry of the given kind, in tree order.
    pub fn kind_values(&self, kind: SchemeKind) -> Vec<&str> {
        let mut values = Vec::new();
        for root in &self.roots {
            collect_kind(root, kind, &mut values);
        }
        values
    }

    /// The declared output name patterns, for working-set filtering.
    pub fn output_patterns(&self) -> Vec<QualifiedName> {
        self.kind_values(SchemeKind::Output)
            .into_iter()
            .map(QualifiedName::from_dotted)
            .collect()
    }
}

fn collect_kind<'a>(node: &'a SchemeNode, kind: SchemeKind, values: &mut Vec<&'a str>) {
    match node {
        SchemeNode::Entry {
            kind: entry_kind,
            text,
            ..
        } if *entry_kind == kind => values.push(text),
        SchemeNode::Branch { children, .. } => {
            for child in children {
                collect_kind(child, kind, values);
            }
        }
        _ => {}
    }
}

/// Parse each leaf's terminal segment against the closed kind set.
fn specialize(node: Node) -> SchemeNode {
    match node {
        Node::Branch { segment, children } => SchemeNode::Branch {
            segment,
            children: children.into_iter().map(specialize).collect(),
        },
        Node::Leaf {
            segment,
            text,
            provenance,
            ..
        } => match SchemeKind::parse(&segment) {
            Some(kind) => SchemeNode::Entry {
                segment,
                kind,
                text,
                provenance,
            },
            None => SchemeNode::Error {
                message: format!("unrecognized scheme entry kind `{segment}`"),
                segment,
                provenance,
            },
        },
        Node::Error {
            segment,
            message,
            provenance,
        } => SchemeNode::Error {
            segment,
            message,
            provenance,
        },
    }
}

/// Resolve a scheme entry set against the given concrete profile names.
pub fn compile_scheme(entries: Vec<Entry>, concrete: &[QualifiedName]) -> SchemeTree {
    let expanded = expand_single_pass(entries, concrete);
    let tree = assemble(resolve(expanded));
    SchemeTree {
        roots: tree.roots.into_iter().map(specialize).collect(),
    }
}
