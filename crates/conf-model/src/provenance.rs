//! Entry provenance
//!
//! Every definition and error carries the source it came from. Provenance
//! drives output ordering (children sorted by first source occurrence),
//! override semantics (later wins), and diagnostics.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Source index conventionally assigned to command-line overrides so they
/// win all override ties against file-based sources.
pub const CLI_SOURCE: u32 = u32::MAX;

/// Where an entry came from: `(source index, line)` plus a human-readable
/// source label.
///
/// The total order, equality, and hash consider only `(source, line)`; the
/// label is carried for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub source: u32,
    pub label: String,
    pub line: u32,
}

impl Provenance {
    pub fn new(source: u32, label: impl Into<String>, line: u32) -> Self {
        Self {
            source,
            label: label.into(),
            line,
        }
    }

    /// Provenance for a command-line override.
    pub fn cli(line: u32) -> Self {
        Self::new(CLI_SOURCE, "<command line>", line)
    }
}

impl PartialEq for Provenance {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.line == other.line
    }
}

impl Eq for Provenance {}

impl Hash for Provenance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.line.hash(state);
    }
}

impl PartialOrd for Provenance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Provenance {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.source, self.line).cmp(&(other.source, other.line))
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.label, self.line)
    }
}
