//! Lexical model for the namespace configuration language
//!
//! This crate holds the pure data types shared by the resolution engine and
//! the output formatters: tokenized names and values, entry provenance, the
//! entry stream produced by parsers, the resolved tree, and scheme entries.
//! It contains no algorithms beyond token concatenation and string rendering.

pub mod entry;
pub mod name;
pub mod provenance;
pub mod scheme;
pub mod tree;
pub mod value;

pub use entry::{Definition, Entry, EntryError};
pub use name::{NameSegment, NameToken, QualifiedName};
pub use provenance::Provenance;
pub use scheme::{SchemeKind, SchemeNode};
pub use tree::Node;
pub use value::{Value, ValueToken};
