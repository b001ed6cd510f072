//! Formatters for resolved configuration trees
//!
//! Downstream of the resolution engine: each formatter consumes the subtree
//! nodes an output's dotted prefix addressed, plus read-only render rules
//! built from the scheme (attribute renames, hidden levels, forced strings,
//! CSV arrays, forced elements), and produces output text.
//!
//! Error nodes are handled per output: any error under an addressed subtree
//! fails that one output, and unrelated outputs still render.

pub mod error;
pub mod flat;
pub mod format;
pub mod ini;
pub mod json;
pub mod output;
pub mod rules;
pub mod xml;
pub mod yaml;

pub use error::{Error, Result};
pub use flat::FlatFormatter;
pub use format::{Format, Formatter};
pub use ini::IniFormatter;
pub use json::JsonFormatter;
pub use output::{RenderedOutput, render_outputs};
pub use rules::RenderRules;
pub use xml::XmlFormatter;
pub use yaml::YamlFormatter;
