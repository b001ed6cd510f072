//! XML formatter
//!
//! Hand-written writer, two-space indentation. Branches become elements and
//! leaves become child elements, except leaves an `attribute` rule selects:
//! those render as attributes on the nearest visible ancestor element,
//! under the rule's attribute name. `hidden` branches splice their children
//! into the parent element; `csv` leaves repeat their element once per
//! comma-separated item.

use crate::error::Result;
use crate::format::{Format, Formatter, ensure_no_errors, path_name};
use crate::rules::RenderRules;
use conf_model::Node;
use std::fmt::Write;

/// Formatter for XML output
#[derive(Debug, Default)]
pub struct XmlFormatter;

impl Formatter for XmlFormatter {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn render(&self, roots: &[&Node], rules: &RenderRules) -> Result<String> {
        ensure_no_errors(roots)?;
        let mut out = String::new();
        for root in roots {
            let mut path = vec![root.segment().to_string()];
            write_node(&mut out, root, &mut path, 0, rules);
        }
        Ok(out)
    }
}

fn write_node(
    out: &mut String,
    node: &Node,
    path: &mut Vec<String>,
    depth: usize,
    rules: &RenderRules,
) {
    let name = path_name(path);
    match node {
        Node::Leaf { segment, text, .. } => {
            if rules.is_hidden(&name) {
                return;
            }
            // attribute leaves were emitted by the nearest visible ancestor
            if rules.attribute_name(&name, segment).is_some() {
                return;
            }
            if rules.is_csv(&name) {
                for item in text.split(',') {
                    write_element(out, depth, segment, item.trim());
                }
            } else {
                write_element(out, depth, segment, text);
            }
        }
        Node::Branch { segment, children } => {
            if rules.is_hidden(&name) {
                for child in children {
                    path.push(child.segment().to_string());
                    write_node(out, child, path, depth, rules);
                    path.pop();
                }
                return;
            }
            let mut attributes = Vec::new();
            collect_attributes(children, path, rules, &mut attributes);

            let mut body = String::new();
            for child in children {
                path.push(child.segment().to_string());
                write_node(&mut body, child, path, depth + 1, rules);
                path.pop();
            }

            indent(out, depth);
            out.push('<');
            out.push_str(segment);
            for (attribute, value) in &attributes {
                let _ = write!(out, " {attribute}=\"{}\"", escape(value));
            }
            if body.is_empty() {
                out.push_str("/>\n");
                return;
            }
            out.push_str(">\n");
            out.push_str(&body);
            indent(out, depth);
            let _ = writeln!(out, "</{segment}>");
        }
        // rejected by ensure_no_errors before writing starts
        Node::Error { .. } => {}
    }
}

/// Pull attribute-rule leaves out of the children, descending through
/// hidden branches so their attributes attach to the visible ancestor.
fn collect_attributes(
    children: &[Node],
    path: &mut Vec<String>,
    rules: &RenderRules,
    attributes: &mut Vec<(String, String)>,
) {
    for child in children {
        path.push(child.segment().to_string());
        let name = path_name(path);
        match child {
            Node::Leaf { segment, text, .. } => {
                if let Some(attribute) = rules.attribute_name(&name, segment) {
                    attributes.push((attribute.to_string(), text.clone()));
                }
            }
            Node::Branch {
                children: nested, ..
            } if rules.is_hidden(&name) => {
                collect_attributes(nested, path, rules, attributes);
            }
            _ => {}
        }
        path.pop();
    }
}

fn write_element(out: &mut String, depth: usize, segment: &str, text: &str) {
    indent(out, depth);
    let _ = writeln!(out, "<{segment}>{}</{segment}>", escape(text));
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
