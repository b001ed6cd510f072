//! Tree assembly
//!
//! Groups the flat resolved entry list into a tree by shared leading name
//! segments. Sibling order is deterministic: every node sorts by the
//! minimum provenance in its subtree, so a branch sits where its earliest
//! entry appeared in the merged source stream, not where grouping happened
//! to encounter it.

use crate::error::{Error, Result};
use crate::matcher::segment_matches;
use crate::resolve::ResolvedEntry;
use conf_model::{Node, QualifiedName};
use std::collections::HashMap;

/// The assembled configuration tree.
///
/// Error entries appear as [`Node::Error`] values in place; the tree itself
/// is always produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTree {
    pub roots: Vec<Node>,
}

impl ResolvedTree {
    /// All nodes whose path from a root matches the (possibly wildcarded)
    /// dotted prefix. The frontier narrows one segment at a time, so
    /// wildcards never cross a dot.
    pub fn find(&self, prefix: &QualifiedName) -> Vec<&Node> {
        let mut frontier: Vec<&Node> = self.roots.iter().collect();
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

    /// Like [`find`](Self::find), but an empty result is an error: the
    /// caller addressed a subtree that does not exist.
    pub fn subtree(&self, prefix: &QualifiedName) -> Result<Vec<&Node>> {
        let nodes = self.find(prefix);
        if nodes.is_empty() {
            return Err(Error::NoSuchPrefix {
                prefix: prefix.clone(),
            });
        }
        Ok(nodes)
    }
}

/// Group resolved entries into a provenance-ordered tree.
pub fn assemble(entries: Vec<ResolvedEntry>) -> ResolvedTree {
    ResolvedTree {
        roots: build_level(entries, 0),
    }
}

fn build_level(entries: Vec<ResolvedEntry>, depth: usize) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    // first-occurrence order; sorted by provenance below
    let mut groups: Vec<(String, Vec<ResolvedEntry>)> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let segment = entry.name().segments()[depth].text();
        if entry.name().len() == depth + 1 {
            nodes.push(terminal_node(segment, entry));
        } else {
            let index = *group_index.entry(segment.clone()).or_insert_with(|| {
                groups.push((segment, Vec::new()));
                groups.len() - 1
            });
            groups[index].1.push(entry);
        }
    }

    for (segment, members) in groups {
        nodes.push(Node::Branch {
            segment,
            children: build_level(members, depth + 1),
        });
    }

    nodes.sort_by(|a, b| a.min_provenance().cmp(&b.min_provenance()));
    nodes
}

fn terminal_node(segment: String, entry: ResolvedEntry) -> Node {
    match entry {
        ResolvedEntry::Value {
            text,
            provenance,
            comments,
            definition,
            ..
        } => Node::Leaf {
            segment,
            text,
            provenance,
            comments,
            definition,
        },
        ResolvedEntry::Error {
            message,
            provenance,
            ..
        } => Node::Error {
            segment,
            message,
            provenance,
        },
    }
}
