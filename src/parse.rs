//! Text formats for problem input.
//!
//! Graphs list one node identifier per line, wrap edges in parentheses, and
//! wrap layout groups in brackets:
//!
//! ```text
//! X1
//! X2
//! (X1, X2)
//! [X1, X2]
//! ```
//!
//! Formulas are 3-literal clauses joined by `AND`, each literal optionally
//! prefixed `NOT`, with optional parentheses per clause:
//!
//! ```text
//! (X1 OR NOT X2 OR X3) AND (X2 OR X3 OR NOT X4)
//! ```
//!
//! Parsing is atomic: on failure no [`Instance`] is constructed.

use crate::element::Literal;
use crate::error::{Error, ParseError};
use crate::instance::{Instance, ProblemKind};

/// Parse graph text into an [`Instance`] of the given graph-backed `kind`
/// ([`IndependentSet`](ProblemKind::IndependentSet) or
/// [`ThreeColoring`](ProblemKind::ThreeColoring)).
pub fn graph(kind: ProblemKind, text: &str) -> Result<Instance, Error> {
    let mut instance = Instance::new(kind);

    for (ind, raw) in text.lines().enumerate() {
        let line = ind + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(inner) = delimited(trimmed, '(', ')') {
            let names = split_names(inner);
            if names.len() != 2 {
                return Err(malformed(line, trimmed));
            }

            let a = resolve(&instance, line, names[0])?;
            let b = resolve(&instance, line, names[1])?;
            instance.add_edge(a, b)?;
        } else if let Some(inner) = delimited(trimmed, '[', ']') {
            let names = split_names(inner);
            if names.is_empty() {
                return Err(malformed(line, trimmed));
            }

            let members = names
                .iter()
                .map(|name| resolve(&instance, line, name))
                .collect::<Result<Vec<_>, _>>()?;
            instance.add_group(members)?;
        } else {
            if trimmed.contains(&[',', '(', ')', '[', ']'][..]) || trimmed.split_whitespace().count() != 1 {
                return Err(malformed(line, trimmed));
            }

            if instance.id_of(trimmed).is_some() {
                return Err(ParseError::DuplicateIdentifier {
                    line,
                    name: trimmed.to_owned(),
                }
                .into());
            }
            instance.add_node(trimmed);
        }
    }

    Ok(instance)
}

/// Parse formula text into a [`ThreeSat`](ProblemKind::ThreeSat) [`Instance`].
///
/// Variables are shared across clauses by name; each distinct name becomes
/// one `Variable` element, inserted at its first occurrence.
pub fn formula(text: &str) -> Result<Instance, Error> {
    let mut instance = Instance::new(ProblemKind::ThreeSat);

    let clause_texts = text
        .split("AND")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>();
    if clause_texts.is_empty() {
        return Err(ParseError::EmptyFormula.into());
    }

    for (ind, clause_text) in clause_texts.into_iter().enumerate() {
        let clause = ind + 1;
        let inner = delimited(clause_text, '(', ')').unwrap_or(clause_text);

        let mut literals: Vec<Literal> = Vec::with_capacity(3);
        let mut tokens = inner.split_whitespace().peekable();

        while tokens.peek().is_some() {
            let mut token = tokens.next().unwrap();
            let negated = token == "NOT";
            if negated {
                token = tokens.next().ok_or_else(|| malformed(clause, clause_text))?;
            }
            if token == "OR" || token == "NOT" {
                return Err(malformed(clause, clause_text));
            }

            let var = instance.add_variable(token);
            literals.push((var, negated));

            match tokens.next() {
                None => break,
                Some("OR") => {
                    if tokens.peek().is_none() {
                        // trailing OR
                        return Err(malformed(clause, clause_text));
                    }
                }
                Some(_) => return Err(malformed(clause, clause_text)),
            }
        }

        let literals: [Literal; 3] = literals
            .try_into()
            .map_err(|list: Vec<Literal>| ParseError::ClauseArity { clause, found: list.len() })?;
        instance.add_clause(literals)?;
    }

    Ok(instance)
}

fn delimited(text: &str, open: char, close: char) -> Option<&str> {
    text.strip_prefix(open)?.strip_suffix(close)
}

fn split_names(inner: &str) -> Vec<&str> {
    inner
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

fn resolve(instance: &Instance, line: usize, name: &str) -> Result<usize, Error> {
    instance.id_of(name).ok_or_else(|| {
        ParseError::UnknownIdentifier {
            line,
            name: name.to_owned(),
        }
        .into()
    })
}

fn malformed(line: usize, text: &str) -> Error {
    ParseError::MalformedLine {
        line,
        text: text.to_owned(),
    }
    .into()
}
