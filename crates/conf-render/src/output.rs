//! Output driving
//!
//! Walks a resolved scheme tree for output blocks (branches declaring
//! `format` and `prefix` entries), builds each block's render rules, and
//! renders the addressed profile subtrees. Failures stay per-output: a bad
//! block or an error node under its prefix fails that one output and the
//! siblings still render.

use crate::error::{Error, Result};
use crate::format::Format;
use crate::rules::RenderRules;
use conf_engine::{ResolvedTree, SchemeTree};
use conf_model::{QualifiedName, SchemeKind, SchemeNode};

/// One rendered output, named for its scheme block path.
pub struct RenderedOutput {
    pub name: String,
    pub result: Result<String>,
}

/// Render every output block the scheme declares against the profile tree.
pub fn render_outputs(tree: &ResolvedTree, scheme: &SchemeTree) -> Vec<RenderedOutput> {
    let mut outputs = Vec::new();
    for root in &scheme.roots {
        walk(root, &mut Vec::new(), tree, &mut outputs);
    }
    outputs
}

fn walk(
    node: &SchemeNode,
    path: &mut Vec<String>,
    tree: &ResolvedTree,
    outputs: &mut Vec<RenderedOutput>,
) {
    let SchemeNode::Branch { segment, children } = node else {
        return;
    };
    path.push(segment.clone());
    if is_output_block(children) {
        let name = path.join(".");
        let result = render_block(node, children, tree);
        if let Err(error) = &result {
            tracing::warn!(output = %name, %error, "output failed");
        }
        outputs.push(RenderedOutput { name, result });
    } else {
        for child in children {
            walk(child, path, tree, outputs);
        }
    }
    path.pop();
}

fn is_output_block(children: &[SchemeNode]) -> bool {
    children.iter().any(|child| {
        matches!(
            child,
            SchemeNode::Entry {
                kind: SchemeKind::Output | SchemeKind::Format | SchemeKind::Prefix,
                ..
            }
        )
    })
}

fn render_block(block: &SchemeNode, children: &[SchemeNode], tree: &ResolvedTree) -> Result<String> {
    // a scheme-side error node fails the block outright
    for child in children {
        if let SchemeNode::Error {
            segment,
            message,
            provenance,
        } = child
        {
            return Err(Error::Subtree {
                segment: segment.clone(),
                message: message.clone(),
                provenance: provenance.clone(),
            });
        }
    }

    let format = match kind_value(children, SchemeKind::Format) {
        Some(text) => Format::parse(text).ok_or_else(|| Error::UnknownFormat {
            name: text.to_string(),
        })?,
        None => return Err(Error::MissingFormat),
    };
    let prefix = match kind_value(children, SchemeKind::Prefix) {
        Some(text) => QualifiedName::from_dotted(text),
        None => return Err(Error::MissingPrefix),
    };

    let roots = tree.subtree(&prefix)?;
    let rules = RenderRules::from_output(block);
    format.formatter().render(&roots, &rules)
}

fn kind_value(children: &[SchemeNode], kind: SchemeKind) -> Option<&str> {
    children.iter().find_map(|child| match child {
        SchemeNode::Entry {
            kind: entry_kind,
            text,
            ..
        } if *entry_kind == kind => Some(text.as_str()),
        _ => None,
    })
}
