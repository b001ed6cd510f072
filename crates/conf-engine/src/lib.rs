//! Resolution engine for the dotted-namespace configuration language
//!
//! Entries flow one way through the pipeline: merged source streams are
//! comment-folded, wildcard patterns are macro-expanded to a fixed point,
//! overrides and `${...}` references are resolved, and the surviving flat
//! entries are assembled into a provenance-ordered tree. Schemes run the
//! same pipeline with single-pass expansion and typed leaves.
//!
//! Resolution always completes: localized failures (unsupported
//! substitutes, missing or cyclic references, unrecognized scheme kinds)
//! become error nodes in the tree, and one bad entry never sinks the rest.
//!
//! The engine is a pure, synchronous computation over the in-memory entry
//! list. All per-run indices are local, so independent resolutions can run
//! concurrently on separate inputs.

pub mod assemble;
pub mod error;
pub mod expand;
pub mod filter;
pub mod matcher;
pub mod merge;
pub mod resolve;
pub mod scheme;

pub use assemble::{ResolvedTree, assemble};
pub use error::{Error, Result};
pub use expand::{expand, expand_single_pass};
pub use filter::filter_entries;
pub use matcher::PatternIndex;
pub use merge::{fold_comments, merge_sources};
pub use resolve::{ResolvedEntry, resolve};
pub use scheme::{SchemeTree, compile_scheme};

use conf_model::Entry;

/// Resolve per-source entry lists into a configuration tree.
///
/// Sources are merged into one global order first; override and
/// tree-ordering semantics depend on it.
///
/// # Examples
///
/// ```
/// use conf_engine::compile;
/// use conf_model::{Definition, Entry, Provenance, QualifiedName, Value};
///
/// let entries = vec![Entry::Definition(Definition::new(
///     QualifiedName::from_dotted("server.host"),
///     Value::literal("localhost"),
///     Provenance::new(0, "base.conf", 1),
/// ))];
/// let tree = compile(vec![entries]);
/// assert_eq!(tree.roots[0].segment(), "server");
/// ```
pub fn compile(sources: Vec<Vec<Entry>>) -> ResolvedTree {
    compile_entries(merge_sources(sources))
}

/// Resolve an already-merged entry list into a configuration tree.
pub fn compile_entries(entries: Vec<Entry>) -> ResolvedTree {
    assemble(resolve(expand(fold_comments(entries))))
}
