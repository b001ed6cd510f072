//! Parsed entries
//!
//! The parser produces an ordered sequence of entries per source. The engine
//! consumes the merged stream; comments are folded into the `comments` field
//! of the following definition or error before expansion starts.

use crate::name::QualifiedName;
use crate::provenance::Provenance;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// An authored or generated `name = value` definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: QualifiedName,
    pub value: Value,
    pub provenance: Provenance,
    /// True for entries materialized by expansion rather than authored.
    /// Generated entries get relaxed missing-reference handling: they are
    /// speculative by construction and dropped silently when dangling.
    pub generated: bool,
    /// Comments immediately preceding this entry in source order
    pub comments: Vec<String>,
}

impl Definition {
    pub fn new(name: QualifiedName, value: Value, provenance: Provenance) -> Self {
        Self {
            name,
            value,
            provenance,
            generated: false,
            comments: Vec::new(),
        }
    }

    /// A definition materialized by expansion.
    pub fn generated(name: QualifiedName, value: Value, provenance: Provenance) -> Self {
        Self {
            generated: true,
            ..Self::new(name, value, provenance)
        }
    }
}

/// An entry that failed parsing or classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryError {
    pub name: QualifiedName,
    pub message: String,
    pub provenance: Provenance,
    pub comments: Vec<String>,
}

impl EntryError {
    pub fn new(name: QualifiedName, message: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            name,
            message: message.into(),
            provenance,
            comments: Vec::new(),
        }
    }
}

/// One element of the parsed entry stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    Definition(Definition),
    Error(EntryError),
    Comment(String),
}

impl Entry {
    pub fn provenance(&self) -> Option<&Provenance> {
        match self {
            Entry::Definition(def) => Some(&def.provenance),
            Entry::Error(err) => Some(&err.provenance),
            Entry::Comment(_) => None,
        }
    }

    pub fn as_definition(&self) -> Option<&Definition> {
        match self {
            Entry::Definition(def) => Some(def),
            _ => None,
        }
    }
}
