//! Override and reference resolution
//!
//! Three steps over the expanded entry set: literal flattening (standalone
//! value wildcards become literal `*`), last-definition-wins override in
//! global source order, and depth-first textual inlining of `${...}`
//! references. Failures are local: one bad entry becomes an error node, the
//! rest of the set resolves normally.
//!
//! The resolver is a pure function of the entry list; its by-name indices
//! are local to a run so the engine stays reentrant.

use conf_model::{
    Definition, Entry, Provenance, QualifiedName, Value, ValueToken,
};
use std::collections::HashMap;

/// A fully resolved entry, ready for tree assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedEntry {
    Value {
        name: QualifiedName,
        text: String,
        provenance: Provenance,
        comments: Vec<String>,
        /// The definition as it looked before reference inlining
        definition: Definition,
    },
    Error {
        name: QualifiedName,
        message: String,
        provenance: Provenance,
    },
}

impl ResolvedEntry {
    pub fn name(&self) -> &QualifiedName {
        match self {
            ResolvedEntry::Value { name, .. } | ResolvedEntry::Error { name, .. } => name,
        }
    }

    pub fn provenance(&self) -> &Provenance {
        match self {
            ResolvedEntry::Value { provenance, .. } | ResolvedEntry::Error { provenance, .. } => {
                provenance
            }
        }
    }
}

/// Why a reference chain failed to resolve
enum Failure {
    Missing {
        target: QualifiedName,
    },
    Cycle {
        chain: Vec<(QualifiedName, Provenance)>,
    },
}

impl Failure {
    fn message(&self) -> String {
        match self {
            Failure::Missing { target } => format!("reference {target} not found"),
            Failure::Cycle { chain } => {
                let links: Vec<String> = chain
                    .iter()
                    .map(|(name, provenance)| format!("{name} ({provenance})"))
                    .collect();
                format!("cyclic reference: {}", links.join(" -> "))
            }
        }
    }
}

/// Replace standalone value wildcards with a literal `*` and merge adjacent
/// literals. After expansion only literal-escape entries still carry
/// standalone wildcards.
fn flatten_literals(value: Value) -> Value {
    Value::new(
        value
            .tokens()
            .iter()
            .map(|token| match token {
                ValueToken::Wildcard => ValueToken::Literal("*".to_string()),
                other => other.clone(),
            })
            .collect(),
    )
}

/// Keep only the last definition per resolved name, in global source order.
/// Earlier duplicates are dropped with a diagnostic; errors pass through.
fn apply_overrides(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by(|a, b| a.provenance().cmp(&b.provenance()));
    let mut last_index: HashMap<QualifiedName, usize> = HashMap::new();
    for (index, entry) in entries.iter().enumerate() {
        if let Entry::Definition(def) = entry {
            last_index.insert(def.name.clone(), index);
        }
    }
    entries
        .into_iter()
        .enumerate()
        .filter(|(index, entry)| match entry {
            Entry::Definition(def) => {
                let keep = last_index.get(&def.name) == Some(index);
                if !keep {
                    tracing::debug!(
                        name = %def.name,
                        provenance = %def.provenance,
                        "dropping overridden definition"
                    );
                }
                keep
            }
            _ => true,
        })
        .map(|(_, entry)| entry)
        .collect()
}

struct Frame {
    name: QualifiedName,
    provenance: Provenance,
    tokens: Vec<ValueToken>,
    position: usize,
    out: String,
}

impl Frame {
    fn new(name: QualifiedName, definition: &Definition) -> Self {
        Self {
            name,
            provenance: definition.provenance.clone(),
            tokens: definition.value.tokens().to_vec(),
            position: 0,
            out: String::new(),
        }
    }
}

/// Resolve one definition's text, inlining references depth-first.
///
/// The visited chain is the explicit frame stack, not call-stack state:
/// cycle diagnostics name every link, and arbitrarily long chains cannot
/// overflow the call stack. Only successful resolutions are cached.
fn resolve_text(
    start: &QualifiedName,
    definitions: &HashMap<QualifiedName, Definition>,
    cache: &mut HashMap<QualifiedName, String>,
) -> Result<String, Failure> {
    if let Some(text) = cache.get(start) {
        return Ok(text.clone());
    }
    let Some(definition) = definitions.get(start) else {
        return Err(Failure::Missing {
            target: start.clone(),
        });
    };
    let mut stack = vec![Frame::new(start.clone(), definition)];
    while !stack.is_empty() {
        let top = stack.len() - 1;
        let token = stack[top].tokens.get(stack[top].position).cloned();
        match token {
            None => {
                let out = std::mem::take(&mut stack[top].out);
                let name = stack[top].name.clone();
                stack.pop();
                cache.insert(name, out.clone());
                match stack.last_mut() {
                    Some(parent) => parent.out.push_str(&out),
                    None => return Ok(out),
                }
            }
            Some(token) => {
                stack[top].position += 1;
                match token {
                    ValueToken::Literal(text) => stack[top].out.push_str(&text),
                    ValueToken::Wildcard => stack[top].out.push('*'),
                    ValueToken::Reference(target) => {
                        if let Some(text) = cache.get(&target) {
                            stack[top].out.push_str(text);
                        } else if let Some(entered) =
                            stack.iter().position(|frame| frame.name == target)
                        {
                            let mut chain: Vec<(QualifiedName, Provenance)> = stack[entered..]
                                .iter()
                                .map(|frame| (frame.name.clone(), frame.provenance.clone()))
                                .collect();
                            chain.push((target.clone(), stack[entered].provenance.clone()));
                            return Err(Failure::Cycle { chain });
                        } else if let Some(next) = definitions.get(&target) {
                            stack.push(Frame::new(target, next));
                        } else {
                            return Err(Failure::Missing { target });
                        }
                    }
                }
            }
        }
    }
    // the stack starts non-empty and only empties through the return above
    Ok(String::new())
}

/// Resolve the expanded entry set: flatten literal escapes, apply override
/// semantics, inline references. Always completes; failures become
/// [`ResolvedEntry::Error`] values local to one entry.
pub fn resolve(entries: Vec<Entry>) -> Vec<ResolvedEntry> {
    let flattened: Vec<Entry> = entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Definition(mut def) => {
                def.value = flatten_literals(def.value);
                Entry::Definition(def)
            }
            other => other,
        })
        .collect();

    let surviving = apply_overrides(flattened);

    let definitions: HashMap<QualifiedName, Definition> = surviving
        .iter()
        .filter_map(Entry::as_definition)
        .map(|def| (def.name.clone(), def.clone()))
        .collect();

    let mut cache: HashMap<QualifiedName, String> = HashMap::new();
    let mut resolved = Vec::with_capacity(surviving.len());
    for entry in surviving {
        match entry {
            Entry::Comment(_) => {}
            Entry::Error(err) => resolved.push(ResolvedEntry::Error {
                name: err.name,
                message: err.message,
                provenance: err.provenance,
            }),
            Entry::Definition(def) => {
                match resolve_text(&def.name, &definitions, &mut cache) {
                    Ok(text) => resolved.push(ResolvedEntry::Value {
                        name: def.name.clone(),
                        text,
                        provenance: def.provenance.clone(),
                        comments: def.comments.clone(),
                        definition: def,
                    }),
                    Err(Failure::Missing { target }) if def.generated => {
                        // speculative by construction; dangling is not an error
                        tracing::debug!(
                            name = %def.name,
                            target = %target,
                            "dropping generated entry with dangling reference"
                        );
                    }
                    Err(failure) => resolved.push(ResolvedEntry::Error {
                        name: def.name.clone(),
                        message: failure.message(),
                        provenance: def.provenance.clone(),
                    }),
                }
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::expand;
    use crate::merge::fold_comments;
    use conf_test_utils::{parse_overrides, parse_source};
    use pretty_assertions::assert_eq;

    fn resolve_text_pairs(source: &str) -> Vec<(String, String)> {
        let entries = fold_comments(parse_source(source, 0, "test.conf"));
        resolve(expand(entries))
            .into_iter()
            .filter_map(|entry| match entry {
                ResolvedEntry::Value { name, text, .. } => Some((name.to_string(), text)),
                ResolvedEntry::Error { .. } => None,
            })
            .collect()
    }

    fn resolve_errors(source: &str) -> Vec<(String, String)> {
        let entries = fold_comments(parse_source(source, 0, "test.conf"));
        resolve(expand(entries))
            .into_iter()
            .filter_map(|entry| match entry {
                ResolvedEntry::Error { name, message, .. } => Some((name.to_string(), message)),
                ResolvedEntry::Value { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_later_definition_wins() {
        assert_eq!(
            resolve_text_pairs("a=1\na=2\n"),
            vec![("a".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_cli_override_wins_over_files() {
        let mut entries = fold_comments(parse_source("a=1\n", 0, "a.conf"));
        entries.extend(fold_comments(parse_overrides("a=9\n")));
        let resolved = resolve(expand(entries));
        assert_eq!(resolved.len(), 1);
        assert!(matches!(
            &resolved[0],
            ResolvedEntry::Value { text, .. } if text == "9"
        ));
    }

    #[test]
    fn test_reference_chain_inlines_textually() {
        let pairs = resolve_text_pairs("a.x=2+${a.y}+${a.z}\na.y=${a.z}/5\na.z=${a.w}\na.w=x\n");
        assert!(pairs.contains(&("a.x".to_string(), "2+x/5+x".to_string())));
        assert!(pairs.contains(&("a.y".to_string(), "x/5".to_string())));
    }

    #[test]
    fn test_cycle_names_every_link() {
        let errors = resolve_errors("x=${y}\ny=${x}\n");
        assert_eq!(errors.len(), 2);
        let (_, message) = &errors[0];
        assert!(message.starts_with("cyclic reference:"), "{message}");
        assert!(message.contains("x (test.conf:1)"), "{message}");
        assert!(message.contains("y (test.conf:2)"), "{message}");
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut source = String::from("k0=${k1}\n");
        for i in 1..5000 {
            source.push_str(&format!("k{}=${{k{}}}\n", i, i + 1));
        }
        source.push_str("k5000=end\n");
        let pairs = resolve_text_pairs(&source);
        assert!(pairs.contains(&("k0".to_string(), "end".to_string())));
    }

    #[test]
    fn test_missing_reference_is_local() {
        let errors = resolve_errors("x=${y}\nok=1\n");
        assert_eq!(
            errors,
            vec![("x".to_string(), "reference y not found".to_string())]
        );
        assert!(resolve_text_pairs("x=${y}\nok=1\n").contains(&("ok".to_string(), "1".to_string())));
    }

    #[test]
    fn test_generated_dangling_reference_dropped_silently() {
        // alias.* generates entries pointing at service addresses; removing
        // the target after generation is simulated by referencing a name
        // that never existed
        let entries = vec![Entry::Definition(Definition::generated(
            QualifiedName::from_dotted("alias.db"),
            conf_test_utils::parse_value("${service.db.addr}").unwrap(),
            Provenance::new(0, "t", 1),
        ))];
        let resolved = resolve(entries);
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_literal_escape_flattens_to_star() {
        assert_eq!(
            resolve_text_pairs("x.a=*\n"),
            vec![("x.a".to_string(), "*".to_string())]
        );
    }

    #[test]
    fn test_resolution_is_idempotent_on_plain_entries() {
        let pairs = resolve_text_pairs("a=1\nb.c=2\n");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b.c".to_string(), "2".to_string())
            ]
        );
    }
}
