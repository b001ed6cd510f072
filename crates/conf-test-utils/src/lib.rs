//! Shared test utilities for the namespace-config workspace
//!
//! The real grammar lives upstream of the engine; tests only need a small
//! line-oriented parser so fixtures can be written as config text:
//!
//! ```text
//! # a comment
//! server.web.host=localhost
//! server.*.port=80
//! alias.web=${server.web.host}
//! ```

use conf_model::{
    Definition, Entry, EntryError, Provenance, QualifiedName, Value, ValueToken, provenance,
};

/// Parse one source into an ordered entry list with per-line provenance.
///
/// Lines are `name=value` definitions, `#` comments, or blank. Malformed
/// lines become `Entry::Error` so partial-failure paths stay testable.
pub fn parse_source(text: &str, source: u32, label: &str) -> Vec<Entry> {
    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_number = (index + 1) as u32;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix('#') {
            entries.push(Entry::Comment(comment.trim().to_string()));
            continue;
        }
        let provenance = Provenance::new(source, label, line_number);
        match trimmed.split_once('=') {
            None => entries.push(Entry::Error(EntryError::new(
                QualifiedName::from_dotted(trimmed),
                "missing '='",
                provenance,
            ))),
            Some((name, value)) => {
                let name = QualifiedName::from_dotted(name.trim());
                match parse_value(value.trim()) {
                    Ok(value) => {
                        entries.push(Entry::Definition(Definition::new(name, value, provenance)));
                    }
                    Err(message) => {
                        entries.push(Entry::Error(EntryError::new(name, message, provenance)));
                    }
                }
            }
        }
    }
    entries
}

/// Parse command-line override text; its entries carry the maximum source
/// index so they win all override ties.
pub fn parse_overrides(text: &str) -> Vec<Entry> {
    parse_source(text, provenance::CLI_SOURCE, "<command line>")
}

/// Tokenize a value: literal runs, standalone `*` wildcards, and
/// `${dotted.name}` references.
pub fn parse_value(text: &str) -> Result<Value, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                name.push(c);
            }
            if !closed {
                return Err("unterminated reference".to_string());
            }
            flush(&mut current, &mut tokens);
            tokens.push(ValueToken::Reference(QualifiedName::from_dotted(&name)));
        } else if ch == '*' {
            flush(&mut current, &mut tokens);
            tokens.push(ValueToken::Wildcard);
        } else {
            current.push(ch);
        }
    }
    flush(&mut current, &mut tokens);
    Ok(Value::new(tokens))
}

fn flush(current: &mut String, tokens: &mut Vec<ValueToken>) {
    if !current.is_empty() {
        tokens.push(ValueToken::Literal(std::mem::take(current)));
    }
}

/// Initialize a tracing subscriber for test binaries.
///
/// Uses `RUST_LOG` when set, defaulting to "info". Safe to call from every
/// test; only the first call installs the subscriber.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).compact())
        .try_init();
}
