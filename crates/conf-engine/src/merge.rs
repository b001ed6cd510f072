//! Source merging and comment folding
//!
//! Override and tree-ordering semantics depend on one global source order,
//! so per-source entry lists are merged into a single `(source, line)`
//! ordered stream before resolution starts. Comment entries are folded into
//! the `comments` field of the next definition or error; the accumulator
//! resets after each emitted node.

use conf_model::Entry;

/// Concatenate per-source entry lists in source-index order.
///
/// Each list must come from a single source and already be line-ordered, as
/// parsers produce them. Sources may have been read concurrently; this is
/// the required merge point.
pub fn merge_sources(mut sources: Vec<Vec<Entry>>) -> Vec<Entry> {
    sources.sort_by_key(|entries| {
        entries
            .iter()
            .find_map(|e| e.provenance().map(|p| p.source))
            .unwrap_or(u32::MAX)
    });
    sources.into_iter().flatten().collect()
}

/// Attach comment entries to the following definition or error.
///
/// Trailing comments with no following entry are dropped.
pub fn fold_comments(entries: Vec<Entry>) -> Vec<Entry> {
    let mut out = Vec::with_capacity(entries.len());
    let mut pending: Vec<String> = Vec::new();
    for entry in entries {
        match entry {
            Entry::Comment(text) => pending.push(text),
            Entry::Definition(mut def) => {
                def.comments = std::mem::take(&mut pending);
                out.push(Entry::Definition(def));
            }
            Entry::Error(mut err) => {
                err.comments = std::mem::take(&mut pending);
                out.push(Entry::Error(err));
            }
        }
    }
    if !pending.is_empty() {
        tracing::debug!(count = pending.len(), "dropping trailing comments");
    }
    out
}
