//! Flat-namespace formatter
//!
//! One `dotted.key=value` line per leaf, in tree order, paths rooted at the
//! addressed subtree. The output is itself valid profile input, so a
//! resolved tree can be re-fed through the pipeline. `hidden` levels drop
//! out of the emitted keys.

use crate::error::Result;
use crate::format::{Format, Formatter, ensure_no_errors, path_name};
use crate::rules::RenderRules;
use conf_model::Node;
use std::fmt::Write;

/// Formatter for flat-namespace output
#[derive(Debug, Default)]
pub struct FlatFormatter;

impl Formatter for FlatFormatter {
    fn format(&self) -> Format {
        Format::Flat
    }

    fn render(&self, roots: &[&Node], rules: &RenderRules) -> Result<String> {
        ensure_no_errors(roots)?;
        let mut out = String::new();
        for root in roots {
            let mut path = vec![root.segment().to_string()];
            write_lines(&mut out, root, &mut path, &mut Vec::new(), rules);
        }
        Ok(out)
    }
}

fn write_lines(
    out: &mut String,
    node: &Node,
    path: &mut Vec<String>,
    key: &mut Vec<String>,
    rules: &RenderRules,
) {
    let hidden = rules.is_hidden(&path_name(path));
    match node {
        Node::Leaf { segment, text, .. } => {
            if hidden {
                return;
            }
            key.push(segment.clone());
            let _ = writeln!(out, "{}={text}", key.join("."));
            key.pop();
        }
        Node::Branch { children, .. } => {
            if !hidden {
                key.push(node.segment().to_string());
            }
            for child in children {
                path.push(child.segment().to_string());
                write_lines(out, child, path, key, rules);
                path.pop();
            }
            if !hidden {
                key.pop();
            }
        }
        Node::Error { .. } => {}
    }
}
