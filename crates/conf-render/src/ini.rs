//! INI formatter
//!
//! Each addressed branch becomes a `[section]` named for its segment;
//! deeper nesting joins into dotted keys. Leaf roots render as bare
//! `key=value` lines ahead of the first section. `hidden` levels are
//! dropped from the emitted key paths.

use crate::error::Result;
use crate::format::{Format, Formatter, ensure_no_errors, path_name};
use crate::rules::RenderRules;
use conf_model::Node;
use std::fmt::Write;

/// Formatter for INI output
#[derive(Debug, Default)]
pub struct IniFormatter;

impl Formatter for IniFormatter {
    fn format(&self) -> Format {
        Format::Ini
    }

    fn render(&self, roots: &[&Node], rules: &RenderRules) -> Result<String> {
        ensure_no_errors(roots)?;
        let mut out = String::new();

        // bare keys come before the first section header
        for root in roots {
            if let Node::Leaf { segment, text, .. } = root {
                let name = path_name(&[segment.clone()]);
                if !rules.is_hidden(&name) {
                    let _ = writeln!(out, "{segment}={text}");
                }
            }
        }
        for root in roots {
            let Node::Branch { segment, children } = root else {
                continue;
            };
            let mut path = vec![segment.clone()];
            if rules.is_hidden(&path_name(&path)) {
                continue;
            }
            let _ = writeln!(out, "[{segment}]");
            for child in children {
                path.push(child.segment().to_string());
                write_keys(&mut out, child, &mut path, &mut Vec::new(), rules);
                path.pop();
            }
        }
        Ok(out)
    }
}

/// Emit `dotted.key=value` lines for every leaf below a section root.
///
/// `path` tracks the tree position for rule lookups; `key` holds only the
/// segments that survive hiding.
fn write_keys(
    out: &mut String,
    node: &Node,
    path: &mut Vec<String>,
    key: &mut Vec<String>,
    rules: &RenderRules,
) {
    let name = path_name(path);
    let hidden = rules.is_hidden(&name);
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
                write_keys(out, child, path, key, rules);
                path.pop();
            }
            if !hidden {
                key.pop();
            }
        }
        Node::Error { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conf_engine::compile;
    use conf_model::{Provenance, SchemeKind, SchemeNode};
    use conf_test_utils::parse_source;
    use pretty_assertions::assert_eq;

    fn render_ini(source: &str, rules: &RenderRules) -> String {
        let tree = compile(vec![parse_source(source, 0, "test.conf")]);
        let roots: Vec<&Node> = tree.roots.iter().collect();
        IniFormatter.render(&roots, rules).unwrap()
    }

    #[test]
    fn test_sections_and_dotted_keys() {
        let out = render_ini(
            "global=1\nserver.web.host=localhost\nserver.web.port=80\n",
            &RenderRules::default(),
        );
        assert_eq!(out, "global=1\n[server]\nweb.host=localhost\nweb.port=80\n");
    }

    #[test]
    fn test_hidden_level_drops_out_of_keys() {
        let rules = RenderRules::from_output(&SchemeNode::Branch {
            segment: "main".to_string(),
            children: vec![SchemeNode::Entry {
                segment: "hidden".to_string(),
                kind: SchemeKind::Hidden,
                text: "server.internal".to_string(),
                provenance: Provenance::new(1, "scheme.conf", 1),
            }],
        });
        let out = render_ini("server.internal.key=1\n", &rules);
        assert_eq!(out, "[server]\nkey=1\n");
    }
}
