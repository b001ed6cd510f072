//! Substitution expander
//!
//! Fixed-point wildcard macro expansion. Every pass classifies each
//! wildcard-carrying definition by its name/value arity and instantiates it
//! against the concrete (wildcard-free) names known so far; the loop stops
//! when a pass adds nothing new. Entries still containing wildcards at the
//! fixed point are pruned silently — an unmatched pattern is not an error.
//!
//! Generated entries are flagged so the resolver can relax missing-reference
//! handling for them: they are speculative by construction.

use crate::matcher::segment_captures;
use conf_model::{
    Definition, Entry, EntryError, NameSegment, NameToken, QualifiedName, Value, ValueToken,
};
use std::collections::HashSet;

/// Safety net against self-referential wildcard chains. Each productive
/// pass adds at least one entry from the finite set of derivable captures,
/// so this cap is never reached by well-formed input.
const MAX_PASSES: usize = 64;

/// Arity classification of a wildcard-carrying definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    /// No wildcards anywhere
    Concrete,
    /// Standalone value wildcards only: the literal-`*` escape, deferred to
    /// the flattening pass
    LiteralEscape,
    /// Wildcards in the name, none in the value
    NamePattern,
    /// `nameArity == valueArity`
    OneToOne,
    /// `nameArity > valueArity`, divisible; captures collapse in blocks
    ManyToOne { block: usize },
    /// `valueArity > nameArity`, divisible; captures are replicated
    OneToMany { reps: usize },
    /// Any other ratio
    Unsupported,
}

fn classify(def: &Definition) -> Class {
    let name_arity = def.name.wildcard_count();
    let standalone = def.value.wildcard_count();
    let embedded = def.value.reference_wildcard_count();
    let value_arity = standalone + embedded;
    if name_arity == 0 && value_arity == 0 {
        Class::Concrete
    } else if name_arity == 0 && embedded == 0 {
        Class::LiteralEscape
    } else if name_arity == 0 {
        Class::Unsupported
    } else if value_arity == 0 {
        Class::NamePattern
    } else if name_arity == value_arity {
        Class::OneToOne
    } else if name_arity > value_arity && name_arity % value_arity == 0 {
        Class::ManyToOne {
            block: name_arity / value_arity,
        }
    } else if value_arity > name_arity && value_arity % name_arity == 0 {
        Class::OneToMany {
            reps: value_arity / name_arity,
        }
    } else {
        Class::Unsupported
    }
}

/// Left-match a concrete name against a pattern.
///
/// The pattern's longest wildcard-free trailing segment run is the literal
/// anchor; the segments before it are matched positionally against the
/// leading segments of the concrete name, which may be longer. Returns the
/// captured strings grouped per pattern segment, or `None` on mismatch.
fn left_match(pattern: &QualifiedName, concrete: &QualifiedName) -> Option<Vec<Vec<String>>> {
    let segments = pattern.segments();
    let mut anchor_start = segments.len();
    while anchor_start > 0 && segments[anchor_start - 1].is_text_only() {
        anchor_start -= 1;
    }
    let pre = &segments[..anchor_start];
    if pre.is_empty() || concrete.len() < pre.len() {
        return None;
    }
    let mut captures = Vec::with_capacity(pre.len());
    for (pattern_segment, concrete_segment) in pre.iter().zip(concrete.segments()) {
        captures.push(segment_captures(pattern_segment, &concrete_segment.text())?);
    }
    Some(captures)
}

/// Whole-name match: every pattern segment against the segment at the same
/// position, equal lengths required. Returns flat captures in token order.
fn full_match(pattern: &QualifiedName, concrete: &QualifiedName) -> Option<Vec<String>> {
    if pattern.len() != concrete.len() {
        return None;
    }
    let mut captures = Vec::new();
    for (pattern_segment, concrete_segment) in pattern.segments().iter().zip(concrete.segments()) {
        captures.extend(segment_captures(pattern_segment, &concrete_segment.text())?);
    }
    Some(captures)
}

/// Replace each wildcard in a name with the next capture, in ordinal order.
fn substitute_name<'a>(
    name: &QualifiedName,
    captures: &mut impl Iterator<Item = &'a String>,
) -> QualifiedName {
    let segments = name
        .segments()
        .iter()
        .map(|segment| {
            if segment.is_text_only() {
                segment.clone()
            } else {
                NameSegment::from_tokens(
                    segment
                        .tokens()
                        .iter()
                        .map(|token| match token {
                            NameToken::Literal(text) => NameToken::Literal(text.clone()),
                            NameToken::Wildcard => {
                                NameToken::Literal(captures.next().cloned().unwrap_or_default())
                            }
                        })
                        .collect(),
                )
            }
        })
        .collect();
    QualifiedName::new(segments)
}

fn instantiate_name(pattern: &QualifiedName, captures: &[String]) -> QualifiedName {
    substitute_name(pattern, &mut captures.iter())
}

/// Replace value wildcards (standalone and reference-embedded) with the
/// given substitutions, in ordinal order.
fn instantiate_value(value: &Value, substitutions: &[String]) -> Value {
    let mut subs = substitutions.iter();
    Value::new(
        value
            .tokens()
            .iter()
            .map(|token| match token {
                ValueToken::Literal(text) => ValueToken::Literal(text.clone()),
                ValueToken::Wildcard => {
                    ValueToken::Literal(subs.next().cloned().unwrap_or_default())
                }
                ValueToken::Reference(name) => {
                    ValueToken::Reference(substitute_name(name, &mut subs))
                }
            })
            .collect(),
    )
}

fn all_equal(captures: &[String]) -> bool {
    captures.windows(2).all(|pair| pair[0] == pair[1])
}

struct PassState {
    fresh: Vec<Entry>,
    seen: HashSet<(QualifiedName, String)>,
    errors_seen: HashSet<(QualifiedName, String)>,
}

impl PassState {
    fn push_generated(&mut self, def: &Definition, name: QualifiedName, value: Value) {
        self.fresh.push(Entry::Definition(Definition::generated(
            name,
            value,
            def.provenance.clone(),
        )));
    }

    fn push_error(&mut self, def: &Definition, message: &str) {
        if self
            .errors_seen
            .insert((def.name.clone(), message.to_string()))
        {
            self.fresh.push(Entry::Error(EntryError::new(
                def.name.clone(),
                message,
                def.provenance.clone(),
            )));
        }
    }
}

/// One expansion pass for a single definition against the concrete names.
fn expand_definition(def: &Definition, concrete: &[QualifiedName], state: &mut PassState) {
    match classify(def) {
        Class::Concrete | Class::LiteralEscape | Class::Unsupported => {}
        Class::NamePattern => {
            for target in concrete {
                let Some(by_segment) = left_match(&def.name, target) else {
                    continue;
                };
                // wildcards collapsed into one segment must bind the same text
                if by_segment.iter().any(|caps| !all_equal(caps)) {
                    state.push_error(def, "unsupported substitute: inconsistent captures");
                    continue;
                }
                let captures: Vec<String> = by_segment.into_iter().flatten().collect();
                let name = instantiate_name(&def.name, &captures);
                state.push_generated(def, name, def.value.clone());
            }
        }
        Class::OneToOne => {
            for target in concrete {
                let Some(by_segment) = left_match(&def.name, target) else {
                    continue;
                };
                let captures: Vec<String> = by_segment.into_iter().flatten().collect();
                let name = instantiate_name(&def.name, &captures);
                let value = instantiate_value(&def.value, &captures);
                state.push_generated(def, name, value);
            }
            if def.value.wildcard_count() == 0 && def.value.reference_wildcard_count() > 0 {
                expand_reference_product(def, concrete, state);
            }
        }
        Class::ManyToOne { block } => {
            for target in concrete {
                let Some(by_segment) = left_match(&def.name, target) else {
                    continue;
                };
                let captures: Vec<String> = by_segment.into_iter().flatten().collect();
                let mut substitutions = Vec::with_capacity(captures.len() / block);
                let mut consistent = true;
                for chunk in captures.chunks(block) {
                    if !all_equal(chunk) {
                        consistent = false;
                        break;
                    }
                    substitutions.push(chunk[0].clone());
                }
                if !consistent {
                    state.push_error(def, "unsupported substitute: inconsistent captures");
                    continue;
                }
                let name = instantiate_name(&def.name, &captures);
                let value = instantiate_value(&def.value, &substitutions);
                state.push_generated(def, name, value);
            }
        }
        Class::OneToMany { reps } => {
            for target in concrete {
                let Some(by_segment) = left_match(&def.name, target) else {
                    continue;
                };
                let captures: Vec<String> = by_segment.into_iter().flatten().collect();
                let substitutions: Vec<String> = captures
                    .iter()
                    .flat_map(|capture| std::iter::repeat_n(capture.clone(), reps))
                    .collect();
                let name = instantiate_name(&def.name, &captures);
                let value = instantiate_value(&def.value, &substitutions);
                state.push_generated(def, name, value);
            }
        }
    }
}

/// When all value arity comes from reference-embedded wildcards, enumerate
/// the cartesian product of whole-name matches across every reference,
/// producing one generated entry per combination whose references point at
/// the matched targets. The references stay unresolved; inlining happens in
/// the resolver.
fn expand_reference_product(def: &Definition, concrete: &[QualifiedName], state: &mut PassState) {
    let mut options: Vec<Vec<(QualifiedName, Vec<String>)>> = Vec::new();
    for reference in def.value.references() {
        if reference.wildcard_count() == 0 {
            options.push(vec![(reference.clone(), Vec::new())]);
            continue;
        }
        let matches: Vec<(QualifiedName, Vec<String>)> = concrete
            .iter()
            .filter_map(|name| {
                full_match(reference, name).map(|captures| (name.clone(), captures))
            })
            .collect();
        if matches.is_empty() {
            return;
        }
        options.push(matches);
    }
    if options.is_empty() {
        return;
    }

    let name_arity = def.name.wildcard_count();
    let mut odometer = vec![0usize; options.len()];
    loop {
        let combined: Vec<String> = odometer
            .iter()
            .zip(&options)
            .flat_map(|(&i, candidates)| candidates[i].1.clone())
            .collect();
        if combined.len() == name_arity {
            let name = instantiate_name(&def.name, &combined);
            let mut targets = odometer
                .iter()
                .zip(&options)
                .map(|(&i, candidates)| candidates[i].0.clone());
            let tokens = def
                .value
                .tokens()
                .iter()
                .map(|token| match token {
                    ValueToken::Reference(original) => {
                        ValueToken::Reference(targets.next().unwrap_or_else(|| original.clone()))
                    }
                    other => other.clone(),
                })
                .collect();
            state.push_generated(def, name, Value::new(tokens));
        }

        // advance the odometer; done once every position wraps
        let mut position = options.len() - 1;
        loop {
            odometer[position] += 1;
            if odometer[position] < options[position].len() {
                break;
            }
            odometer[position] = 0;
            if position == 0 {
                return;
            }
            position -= 1;
        }
    }
}

fn concrete_names(entries: &[Entry]) -> Vec<QualifiedName> {
    entries
        .iter()
        .filter_map(Entry::as_definition)
        .filter(|def| def.name.is_text_only())
        .map(|def| def.name.clone())
        .collect()
}

/// Run one pass over all entries. Returns true when the pass changed the
/// entry set (new entries or entries converted to errors).
fn run_pass(entries: &mut Vec<Entry>, concrete: &[QualifiedName], state: &mut PassState) -> bool {
    let mut replacements: Vec<(usize, EntryError)> = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let Entry::Definition(def) = entry else {
            continue;
        };
        if classify(def) == Class::Unsupported {
            replacements.push((
                index,
                EntryError::new(
                    def.name.clone(),
                    "unsupported substitute",
                    def.provenance.clone(),
                ),
            ));
            continue;
        }
        expand_definition(def, concrete, state);
    }

    let mut changed = !replacements.is_empty();
    for (index, error) in replacements {
        entries[index] = Entry::Error(error);
    }
    for entry in state.fresh.drain(..) {
        if let Entry::Definition(def) = &entry {
            if !state.seen.insert((def.name.clone(), def.value.to_string())) {
                continue;
            }
        }
        entries.push(entry);
        changed = true;
    }
    changed
}

/// Drop definitions that still carry wildcards in their name or in embedded
/// reference names. Literal-escape entries (standalone value wildcards on a
/// concrete name) survive for the flattening pass.
fn prune(entries: &mut Vec<Entry>) {
    entries.retain(|entry| match entry {
        Entry::Definition(def) => {
            let keep = def.name.is_text_only() && def.value.reference_wildcard_count() == 0;
            if !keep {
                tracing::debug!(name = %def.name, "pruning unmatched pattern");
            }
            keep
        }
        _ => true,
    });
}

fn initial_state(entries: &[Entry]) -> PassState {
    PassState {
        fresh: Vec::new(),
        seen: entries
            .iter()
            .filter_map(Entry::as_definition)
            .map(|def| (def.name.clone(), def.value.to_string()))
            .collect(),
        errors_seen: HashSet::new(),
    }
}

/// Expand the full entry set to its fixed point, then prune leftovers.
pub fn expand(entries: Vec<Entry>) -> Vec<Entry> {
    let mut entries = entries;
    let mut state = initial_state(&entries);
    for pass in 0..MAX_PASSES {
        let concrete = concrete_names(&entries);
        if !run_pass(&mut entries, &concrete, &mut state) {
            tracing::debug!(passes = pass, "expansion reached fixed point");
            break;
        }
    }
    prune(&mut entries);
    entries
}

/// Expand against a fixed externally supplied list of concrete names, in a
/// single pass. Used for scheme entries, which never feed back into
/// themselves.
pub fn expand_single_pass(entries: Vec<Entry>, concrete: &[QualifiedName]) -> Vec<Entry> {
    let mut entries = entries;
    let mut state = initial_state(&entries);
    run_pass(&mut entries, concrete, &mut state);
    prune(&mut entries);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use conf_model::Provenance;
    use conf_test_utils::parse_source;
    use pretty_assertions::assert_eq;

    fn names_and_values(entries: &[Entry]) -> Vec<(String, String)> {
        entries
            .iter()
            .filter_map(Entry::as_definition)
            .map(|def| (def.name.to_string(), def.value.to_string()))
            .collect()
    }

    #[rstest::rstest]
    #[case("a.b", "1", Class::Concrete)]
    #[case("a.b", "*", Class::LiteralEscape)]
    #[case("a.*", "1", Class::NamePattern)]
    #[case("a.*", "${b.*}", Class::OneToOne)]
    #[case("a.*-*", "${b.*}", Class::ManyToOne { block: 2 })]
    #[case("a.*", "*,*", Class::OneToMany { reps: 2 })]
    #[case("a.*-*", "*,*,*", Class::Unsupported)]
    #[case("a.b", "${c.*}", Class::Unsupported)]
    fn test_classify_ratios(#[case] name: &str, #[case] value: &str, #[case] expected: Class) {
        let source = format!("{name}={value}");
        let parsed = parse_source(&source, 0, "t");
        let def = parsed[0].as_definition().unwrap();
        let def = Definition::new(def.name.clone(), def.value.clone(), Provenance::new(0, "t", 1));
        assert_eq!(classify(&def), expected, "{name}={value}");
    }

    #[test]
    fn test_left_match_anchors_trailing_literals() {
        let pattern = QualifiedName::from_dotted("x.*.a");
        let captures = left_match(&pattern, &QualifiedName::from_dotted("x.q.z")).unwrap();
        assert_eq!(captures, vec![vec![], vec!["q".to_string()]]);
        assert!(left_match(&pattern, &QualifiedName::from_dotted("y.q")).is_none());
    }

    #[test]
    fn test_left_match_allows_longer_concrete_names() {
        let pattern = QualifiedName::from_dotted("a.*");
        let captures = left_match(&pattern, &QualifiedName::from_dotted("a.x.y")).unwrap();
        assert_eq!(captures, vec![vec![], vec!["x".to_string()]]);
    }

    #[test]
    fn test_one_to_one_rewrites_existing_key() {
        let entries = parse_source("a.x=1\na.*=2\n", 0, "t");
        let expanded = expand(fold(entries));
        let pairs = names_and_values(&expanded);
        assert!(pairs.contains(&("a.x".to_string(), "1".to_string())));
        assert!(pairs.contains(&("a.x".to_string(), "2".to_string())));
        // the pattern itself is pruned
        assert!(!pairs.iter().any(|(name, _)| name.contains('*')));
    }

    #[test]
    fn test_name_pattern_synthesizes_anchored_keys() {
        let entries = parse_source("x.q.z=5\nx.*.a=1\n", 0, "t");
        let expanded = expand(fold(entries));
        let pairs = names_and_values(&expanded);
        assert!(pairs.contains(&("x.q.a".to_string(), "1".to_string())));
    }

    #[test]
    fn test_unmatched_pattern_is_pruned_silently() {
        let entries = parse_source("x.*.a=1\ny.y=2\n", 0, "t");
        let expanded = expand(fold(entries));
        assert_eq!(
            names_and_values(&expanded),
            vec![("y.y".to_string(), "2".to_string())]
        );
        assert!(!expanded.iter().any(|e| matches!(e, Entry::Error(_))));
    }

    #[test]
    fn test_many_to_one_collapses_consistent_captures() {
        let entries = parse_source("a.x-x=1\na.*-*=2\n", 0, "t");
        let expanded = expand(fold(entries));
        let pairs = names_and_values(&expanded);
        assert!(pairs.contains(&("a.x-x".to_string(), "2".to_string())));
    }

    #[test]
    fn test_inconsistent_collapsed_captures_become_error() {
        let entries = parse_source("a.x-y=1\na.*-*=2\n", 0, "t");
        let expanded = expand(fold(entries));
        let pairs = names_and_values(&expanded);
        assert!(!pairs.contains(&("a.x-y".to_string(), "2".to_string())));
        assert!(expanded.iter().any(|e| matches!(
            e,
            Entry::Error(err) if err.message.starts_with("unsupported substitute")
        )));
    }

    #[test]
    fn test_unsupported_ratio_becomes_error() {
        let entries = parse_source("a.*-*=*,*,*\na.x-y=1\n", 0, "t");
        let expanded = expand(fold(entries));
        assert!(expanded.iter().any(|e| matches!(
            e,
            Entry::Error(err) if err.message == "unsupported substitute"
        )));
    }

    #[test]
    fn test_reference_product_enumerates_targets() {
        let entries = parse_source(
            "service.db.addr=10.0.0.1\nservice.web.addr=10.0.0.2\nalias.*=${service.*.addr}\n",
            0,
            "t",
        );
        let expanded = expand(fold(entries));
        let pairs = names_and_values(&expanded);
        assert!(pairs.contains(&("alias.db".to_string(), "${service.db.addr}".to_string())));
        assert!(pairs.contains(&("alias.web".to_string(), "${service.web.addr}".to_string())));
    }

    #[test]
    fn test_generated_entries_are_flagged() {
        let entries = parse_source("a.x=1\na.*=2\n", 0, "t");
        let expanded = expand(fold(entries));
        let generated: Vec<&Definition> = expanded
            .iter()
            .filter_map(Entry::as_definition)
            .filter(|def| def.generated)
            .collect();
        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].name.to_string(), "a.x");
    }

    #[test]
    fn test_chained_expansion_reaches_fixed_point() {
        // the first pattern's output feeds the second in a later pass
        let entries = parse_source("seed.one=1\nstage.*=${seed.*}\nfinal.*=${stage.*}\n", 0, "t");
        let expanded = expand(fold(entries));
        let pairs = names_and_values(&expanded);
        assert!(pairs.contains(&("stage.one".to_string(), "${seed.one}".to_string())));
        assert!(pairs.contains(&("final.one".to_string(), "${stage.one}".to_string())));
    }

    #[test]
    fn test_literal_escape_survives_expansion() {
        let entries = parse_source("x.a=*\n", 0, "t");
        let expanded = expand(fold(entries));
        assert_eq!(
            names_and_values(&expanded),
            vec![("x.a".to_string(), "*".to_string())]
        );
    }

    #[test]
    fn test_expansion_is_idempotent_on_concrete_entries() {
        let entries = fold(parse_source("a.x=1\nb.y=2\n", 0, "t"));
        let expanded = expand(entries.clone());
        assert_eq!(expanded, entries);
    }

    fn fold(entries: Vec<Entry>) -> Vec<Entry> {
        crate::merge::fold_comments(entries)
    }
}
