//! JSON formatter
//!
//! Builds a `serde_json::Value` from the addressed subtrees and pretty-
//! prints it. Leaf texts are auto-typed (bool, integer, float, else string)
//! unless a `text` rule matches; `csv` leaves split into arrays; `hidden`
//! branches splice their children into the parent object.
//!
//! The YAML formatter reuses the same value conversion.

use crate::error::Result;
use crate::format::{Format, Formatter, ensure_no_errors, path_name};
use crate::rules::RenderRules;
use conf_model::Node;
use serde_json::{Map, Value};

/// Formatter for JSON output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self) -> Format {
        Format::Json
    }

    fn render(&self, roots: &[&Node], rules: &RenderRules) -> Result<String> {
        ensure_no_errors(roots)?;
        let value = Value::Object(subtree_object(roots, rules));
        let mut out = serde_json::to_string_pretty(&value)?;
        out.push('\n');
        Ok(out)
    }
}

/// Convert addressed subtrees into one object keyed by root segment.
pub(crate) fn subtree_object(roots: &[&Node], rules: &RenderRules) -> Map<String, Value> {
    let mut object = Map::new();
    for root in roots {
        let mut path = vec![root.segment().to_string()];
        insert_node(&mut object, root, &mut path, rules);
    }
    object
}

/// Insert one node into its parent object; `path` already ends with the
/// node's segment.
fn insert_node(
    parent: &mut Map<String, Value>,
    node: &Node,
    path: &mut Vec<String>,
    rules: &RenderRules,
) {
    let name = path_name(path);
    match node {
        Node::Leaf { segment, text, .. } => {
            if rules.is_hidden(&name) {
                return;
            }
            let forced_string = rules.is_text(&name);
            let value = if rules.is_csv(&name) {
                Value::Array(
                    text.split(',')
                        .map(|item| typed(item.trim(), forced_string))
                        .collect(),
                )
            } else {
                typed(text, forced_string)
            };
            parent.insert(segment.clone(), value);
        }
        Node::Branch { segment, children } => {
            if rules.is_hidden(&name) {
                for child in children {
                    path.push(child.segment().to_string());
                    insert_node(parent, child, path, rules);
                    path.pop();
                }
                return;
            }
            let mut object = Map::new();
            for child in children {
                path.push(child.segment().to_string());
                insert_node(&mut object, child, path, rules);
                path.pop();
            }
            parent.insert(segment.clone(), Value::Object(object));
        }
        // rejected by ensure_no_errors before conversion starts
        Node::Error { .. } => {}
    }
}

fn typed(text: &str, forced_string: bool) -> Value {
    if forced_string {
        return Value::String(text.to_string());
    }
    auto_type(text)
}

/// Best-effort scalar typing of resolved text.
fn auto_type(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(integer) = text.parse::<i64>() {
        return Value::Number(integer.into());
    }
    if let Ok(float) = text.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use conf_engine::compile;
    use conf_test_utils::parse_source;
    use pretty_assertions::assert_eq;

    fn render_json(source: &str) -> String {
        let tree = compile(vec![parse_source(source, 0, "test.conf")]);
        let roots: Vec<&Node> = tree.roots.iter().collect();
        JsonFormatter
            .render(&roots, &RenderRules::default())
            .unwrap()
    }

    #[test]
    fn test_scalars_are_auto_typed() {
        assert_eq!(auto_type("80"), Value::Number(80.into()));
        assert_eq!(auto_type("true"), Value::Bool(true));
        assert_eq!(auto_type("1.5"), serde_json::json!(1.5));
        assert_eq!(auto_type("localhost"), Value::String("localhost".into()));
    }

    #[test]
    fn test_renders_nested_objects() {
        let out = render_json("server.web.host=localhost\nserver.web.port=80\n");
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"server": {"web": {"host": "localhost", "port": 80}}})
        );
    }

    #[test]
    fn test_error_node_fails_the_output() {
        let tree = compile(vec![parse_source("a.x=${missing}\n", 0, "test.conf")]);
        let roots: Vec<&Node> = tree.roots.iter().collect();
        let err = JsonFormatter
            .render(&roots, &RenderRules::default())
            .unwrap_err();
        assert!(err.to_string().contains("reference missing not found"));
    }
}
