//! Pure validity predicates for each supported problem kind.
//!
//! Evaluators read only structural data and the candidate they are handed;
//! they never touch highlight state. A valid candidate additionally yields a
//! [`SolutionGrouping`] assigning each element a small group index, which the
//! renderer maps to a display color.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::element::{ElementId, GroupIndex};
use crate::error::Error;
use crate::instance::Instance;

/// A candidate truth assignment, keyed by variable element id.
///
/// Variables absent from the map are taken as false.
pub type Assignment = BTreeMap<ElementId, bool>;

/// A candidate node selection, e.g. a claimed independent set.
pub type Selection = BTreeSet<ElementId>;

/// A candidate coloring, node id to color index in `0..3`.
pub type Coloring = BTreeMap<ElementId, GroupIndex>;

/// Number of colors available to [`three_coloring`].
pub const COLOR_COUNT: usize = 3;

/// Solution group indexes produced by [`three_sat`] for true and false variables.
pub const GROUP_TRUE: GroupIndex = 0;
/// See [`GROUP_TRUE`].
pub const GROUP_FALSE: GroupIndex = 1;
/// Clauses are grouped as `GROUP_CLAUSE_BASE + index of the satisfying literal`,
/// keeping clause groups disjoint from the variable groups.
pub const GROUP_CLAUSE_BASE: GroupIndex = 2;

/// Element id to solution group index, driving solution highlight colors.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SolutionGrouping {
    groups: BTreeMap<ElementId, GroupIndex>,
}

impl SolutionGrouping {
    /// The group assigned to `id`, if any.
    pub fn group_of(&self, id: ElementId) -> Option<GroupIndex> {
        self.groups.get(&id).copied()
    }

    /// All `(element id, group)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, GroupIndex)> + '_ {
        self.groups.iter().map(|(id, group)| (*id, *group))
    }

    /// Number of grouped elements.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no element is grouped.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<(ElementId, GroupIndex)> for SolutionGrouping {
    fn from_iter<T: IntoIterator<Item = (ElementId, GroupIndex)>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

/// Outcome of evaluating a candidate against an instance.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Evaluation {
    /// Whether the candidate solves the instance.
    pub valid: bool,
    /// Canonical grouping of the solution; present only when valid.
    pub grouping: Option<SolutionGrouping>,
}

impl Evaluation {
    fn invalid() -> Self {
        Self::default()
    }
}

/// Check whether `selection` is an independent set in `instance`.
///
/// Valid iff no two selected nodes are joined by an edge. The grouping places
/// selected nodes in group 0 and every other node in group 1.
///
/// Fails with [`Error::UnknownElement`] if the selection references an absent id.
pub fn independent_set(instance: &Instance, selection: &Selection) -> Result<Evaluation, Error> {
    for id in selection {
        instance.registry().get(*id)?;
    }

    let valid = !selection
        .iter()
        .tuple_combinations()
        .any(|(a, b)| instance.has_edge(*a, *b));
    if !valid {
        return Ok(Evaluation::invalid());
    }

    let grouping = instance
        .node_ids()
        .map(|id| (id, if selection.contains(&id) { 0 } else { 1 }))
        .collect();
    Ok(Evaluation {
        valid,
        grouping: Some(grouping),
    })
}

/// Check whether `assignment` satisfies the 3-CNF formula in `instance`.
///
/// A clause is satisfied when some literal has `value != negated`; variables
/// missing from the assignment count as false. The grouping puts true
/// variables in [`GROUP_TRUE`], false variables in [`GROUP_FALSE`], and each
/// clause in [`GROUP_CLAUSE_BASE`] plus the index of its first satisfying
/// literal.
///
/// Fails with [`Error::UnknownElement`] if the assignment references an absent id.
pub fn three_sat(instance: &Instance, assignment: &Assignment) -> Result<Evaluation, Error> {
    for id in assignment.keys() {
        instance.registry().get(*id)?;
    }

    let value_of = |var: ElementId| assignment.get(&var).copied().unwrap_or(false);

    let mut grouping: Vec<(ElementId, GroupIndex)> = Vec::new();
    for (clause, literals) in instance.clauses() {
        let satisfied_by = literals
            .iter()
            .position(|(var, negated)| value_of(*var) != *negated);
        match satisfied_by {
            None => return Ok(Evaluation::invalid()),
            Some(ind) => grouping.push((clause, GROUP_CLAUSE_BASE + ind)),
        }
    }

    grouping.extend(instance.variable_ids().map(|var| {
        (var, if value_of(var) { GROUP_TRUE } else { GROUP_FALSE })
    }));

    Ok(Evaluation {
        valid: true,
        grouping: Some(grouping.into_iter().collect()),
    })
}

/// Check whether `coloring` is a proper 3-coloring of the graph in `instance`.
///
/// Valid iff every color is below [`COLOR_COUNT`] and no edge joins two nodes
/// of the same color; uncolored nodes constrain nothing. The grouping is the
/// coloring itself.
///
/// Fails with [`Error::UnknownElement`] if the coloring references an absent id.
pub fn three_coloring(instance: &Instance, coloring: &Coloring) -> Result<Evaluation, Error> {
    for id in coloring.keys() {
        instance.registry().get(*id)?;
    }

    if coloring.values().any(|color| *color >= COLOR_COUNT) {
        return Ok(Evaluation::invalid());
    }

    let monochromatic = instance.edges().any(|(_, endpoints)| {
        match (coloring.get(&endpoints.0), coloring.get(&endpoints.1)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    });
    if monochromatic {
        return Ok(Evaluation::invalid());
    }

    Ok(Evaluation {
        valid: true,
        grouping: Some(coloring.iter().map(|(id, color)| (*id, *color)).collect()),
    })
}
