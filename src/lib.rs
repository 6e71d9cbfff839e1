#![warn(missing_docs)]

//! # `gadgetry`
//!
//! The correspondence and evaluation core of an NP-complete reduction visualizer.
//! A source problem instance (say a 3-CNF formula) is displayed next to the instance a textbook
//! reduction builds from it (say an independent-set graph); clicking an element on either side
//! highlights everything it corresponds to on the other, and a key toggle overlays a computed
//! solution on both.
//!
//! Begin by parsing an [`Instance`] from text with the [`parse`] module (or assembling one with
//! the methods on [`Instance`]), build a [`Reduction`] of the desired [`ReductionKind`] from it,
//! and wrap the result in a [`Session`]. The session consumes already-resolved click events and
//! solution toggles and yields per-panel highlight snapshots for the renderer; hit testing,
//! layout, and drawing are the embedding application's business.
//!
//! # Internals
//! Two reductions are built in: 3-SAT to Independent-Set (one triangle per clause, edges between
//! complementary literal occurrences) and 3-SAT to 3-Coloring (a shared Base/True/False triangle
//! with per-variable literal pairs and two chained OR gadgets per clause).
//! While building the target graph, each constructor records a [`ReductionMapping`]: for every
//! source element, the set of target elements it was transformed into. Selection propagation is a
//! lookup in this table; solution display finds a satisfying assignment with a SAT solver,
//! carries it across the reduction, and checks both sides with the pure evaluators in
//! [`problem`].

pub use element::{Element, ElementId, ElementKind, GroupIndex, Highlight, Literal, Registry};
pub use engine::{ElementHighlight, Panel, Session, SessionState};
pub use error::{Error, ParseError};
pub use instance::{Instance, ProblemKind};
pub use problem::{Assignment, Coloring, Evaluation, Selection, SolutionGrouping};
pub use reduction::{CorrespondenceEntry, Reduction, ReductionKind, ReductionMapping, TargetSolution};
pub use solver::FormulaSolver;

pub(crate) mod element;
pub(crate) mod engine;
pub(crate) mod error;
pub(crate) mod instance;
pub mod parse;
pub mod problem;
pub(crate) mod reduction;
pub(crate) mod solver;
mod tests;
