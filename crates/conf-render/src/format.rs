//! Output formats and the formatter trait

use crate::error::{Error, Result};
use crate::rules::RenderRules;
use conf_model::{NameSegment, Node, QualifiedName};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Xml,
    Json,
    Yaml,
    Ini,
    Flat,
}

impl Format {
    /// Parse a scheme `format` entry value.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "xml" => Some(Self::Xml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "ini" => Some(Self::Ini),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Ini => "ini",
            Self::Flat => "flat",
        }
    }

    /// The formatter implementing this format.
    pub fn formatter(&self) -> Box<dyn Formatter> {
        match self {
            Self::Xml => Box::new(crate::xml::XmlFormatter),
            Self::Json => Box::new(crate::json::JsonFormatter),
            Self::Yaml => Box::new(crate::yaml::YamlFormatter),
            Self::Ini => Box::new(crate::ini::IniFormatter),
            Self::Flat => Box::new(crate::flat::FlatFormatter),
        }
    }
}

/// Trait for format-specific renderers.
///
/// `roots` are the subtree nodes an output's prefix addressed; key patterns
/// in `rules` are matched against the dotted path from the addressed root,
/// root segment included.
pub trait Formatter {
    /// Format identifier
    fn format(&self) -> Format;

    /// Render the addressed subtrees to output text.
    ///
    /// Any error node under a root fails the whole output.
    fn render(&self, roots: &[&Node], rules: &RenderRules) -> Result<String>;
}

/// Fail on the first error node under any root.
pub(crate) fn ensure_no_errors(roots: &[&Node]) -> Result<()> {
    for root in roots {
        if let Some(Node::Error {
            segment,
            message,
            provenance,
        }) = root.first_error()
        {
            return Err(Error::Subtree {
                segment: segment.clone(),
                message: message.clone(),
                provenance: provenance.clone(),
            });
        }
    }
    Ok(())
}

/// A rule-lookup name from a walked segment path.
pub(crate) fn path_name(path: &[String]) -> QualifiedName {
    QualifiedName::new(
        path.iter()
            .map(|segment| NameSegment::literal(segment.as_str()))
            .collect(),
    )
}
