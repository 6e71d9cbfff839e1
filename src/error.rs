use thiserror::Error;

use crate::element::ElementId;
use crate::instance::ProblemKind;

/// Reasons a graph or formula text file may be rejected.
///
/// A parse failure is atomic: no partial [`Instance`](crate::Instance) is ever constructed.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    /// A line could not be classified as a node, edge, group, or clause.
    #[error("line {line}: malformed input `{text}`")]
    MalformedLine {
        /// 1-based line number in the input.
        line: usize,
        /// The offending line, trimmed.
        text: String,
    },
    /// An edge or group line referenced an identifier no node line declared.
    #[error("line {line}: unknown identifier `{name}`")]
    UnknownIdentifier {
        /// 1-based line number in the input.
        line: usize,
        /// The identifier that was never declared.
        name: String,
    },
    /// The same node identifier was declared twice.
    #[error("line {line}: duplicate identifier `{name}`")]
    DuplicateIdentifier {
        /// 1-based line number in the input.
        line: usize,
        /// The identifier declared more than once.
        name: String,
    },
    /// A clause did not contain exactly three literals.
    #[error("clause {clause}: expected 3 literals, found {found}")]
    ClauseArity {
        /// 1-based index of the clause in the formula.
        clause: usize,
        /// How many literals the clause actually contained.
        found: usize,
    },
    /// The input contained no clauses at all.
    #[error("formula is empty")]
    EmptyFormula,
}

/// Errors surfaced by registries, reductions, and the selection engine.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Malformed graph or formula text; see [`ParseError`].
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// An element was inserted under an id the registry already holds.
    #[error("duplicate element id {0}")]
    DuplicateId(ElementId),
    /// An id did not resolve to any element in the addressed registry.
    ///
    /// A correct renderer never produces such ids; this is not recovered from.
    #[error("unknown element id {0}")]
    UnknownElement(ElementId),
    /// No reduction is registered for the source problem kind.
    #[error("no reduction from source kind {0}")]
    UnsupportedReduction(ProblemKind),
    /// A correspondence entry referenced an id absent from its instance.
    ///
    /// Indicates a bug in a reduction builder; fatal.
    #[error("correspondence references missing element id {0}")]
    DanglingCorrespondence(ElementId),
}
