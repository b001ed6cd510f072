//! Working-set filtering
//!
//! Optional pre-expansion reduction: given a scheme's declared output name
//! patterns, keep only the definitions an output could select, plus
//! everything they transitively reference. Both sides may still contain
//! wildcards at this stage, so overlap tests are conservative — when a
//! match cannot be ruled out the definition is kept. Skipping the filter
//! never changes resolution results.

use conf_model::{Entry, NameSegment, QualifiedName};

/// Can these two (possibly wildcarded) segments bind the same text?
fn segments_overlap(a: &NameSegment, b: &NameSegment) -> bool {
    match (a.is_text_only(), b.is_text_only()) {
        (true, true) => a.text() == b.text(),
        (false, true) => crate::matcher::segment_matches(a, &b.text()),
        (true, false) => crate::matcher::segment_matches(b, &a.text()),
        // two patterns; cannot rule a common binding out
        (false, false) => true,
    }
}

/// Does a definition name fall under an output pattern? The pattern acts as
/// a prefix: each of its segments must overlap the segment at the same
/// position, and the name may be longer.
fn prefix_overlaps(pattern: &QualifiedName, name: &QualifiedName) -> bool {
    pattern.len() <= name.len()
        && pattern
            .segments()
            .iter()
            .zip(name.segments())
            .all(|(p, n)| segments_overlap(p, n))
}

/// Could a reference to `target` end up pointing at `name` after expansion?
/// Whole-name overlap: equal lengths, every segment pair compatible.
fn names_may_refer(target: &QualifiedName, name: &QualifiedName) -> bool {
    target.len() == name.len()
        && target
            .segments()
            .iter()
            .zip(name.segments())
            .all(|(t, n)| segments_overlap(t, n))
}

/// Keep the definitions selected by the output patterns plus the closure of
/// their references. Comments and errors pass through untouched.
pub fn filter_entries(entries: Vec<Entry>, outputs: &[QualifiedName]) -> Vec<Entry> {
    let names: Vec<Option<&QualifiedName>> = entries
        .iter()
        .map(|entry| entry.as_definition().map(|def| &def.name))
        .collect();

    let mut selected: Vec<bool> = names
        .iter()
        .map(|name| match name {
            Some(name) => outputs.iter().any(|output| prefix_overlaps(output, name)),
            None => true,
        })
        .collect();

    // transitive closure over reference targets
    let mut changed = true;
    while changed {
        changed = false;
        for index in 0..entries.len() {
            if !selected[index] {
                continue;
            }
            let Some(def) = entries[index].as_definition() else {
                continue;
            };
            for target in def.value.references() {
                for (other, name) in names.iter().enumerate() {
                    if let Some(name) = name {
                        if !selected[other] && names_may_refer(target, name) {
                            selected[other] = true;
                            changed = true;
                        }
                    }
                }
            }
        }
    }

    let kept = selected.iter().filter(|s| **s).count();
    tracing::debug!(total = entries.len(), kept, "filtered working set");

    entries
        .into_iter()
        .zip(selected)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect()
}
