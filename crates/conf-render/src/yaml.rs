//! YAML formatter
//!
//! Shares the JSON formatter's value conversion; `serde_yaml` serializes
//! the resulting `serde_json::Value` directly.

use crate::error::Result;
use crate::format::{Format, Formatter, ensure_no_errors};
use crate::json::subtree_object;
use crate::rules::RenderRules;
use conf_model::Node;

/// Formatter for YAML output
#[derive(Debug, Default)]
pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn render(&self, roots: &[&Node], rules: &RenderRules) -> Result<String> {
        ensure_no_errors(roots)?;
        let value = serde_json::Value::Object(subtree_object(roots, rules));
        Ok(serde_yaml::to_string(&value)?)
    }
}
