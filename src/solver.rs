use std::collections::HashMap;

use itertools::Itertools;
use varisat::{CnfFormula, Lit, Solver, Var};

use crate::element::ElementId;
use crate::instance::Instance;
use crate::problem::Assignment;

/// SAT-backed solution finder for a [`ThreeSat`](crate::ProblemKind::ThreeSat) instance.
///
/// Each variable element becomes one solver variable, in registry insertion
/// order, so the encoding (and the model found) is deterministic for a given
/// instance. Use [`Self::solve`] to attempt to find a satisfying assignment.
pub struct FormulaSolver<'a> {
    instance: &'a Instance,
    // variable element ids in insertion order; position = solver var index
    variables: Vec<ElementId>,
    var_index: HashMap<ElementId, usize>,
}

impl<'a> From<&'a Instance> for FormulaSolver<'a> {
    fn from(instance: &'a Instance) -> Self {
        let variables = instance.variable_ids().collect_vec();
        let var_index = variables
            .iter()
            .enumerate()
            .map(|(ind, id)| (*id, ind))
            .collect();

        Self {
            instance,
            variables,
            var_index,
        }
    }
}

impl FormulaSolver<'_> {
    fn literal(&self, var: ElementId, negated: bool) -> Lit {
        Var::from_index(self.var_index[&var]).lit(!negated)
    }

    /// Search for a satisfying assignment.
    ///
    /// Returns [`None`] when the formula is unsatisfiable. A formula with no
    /// clauses is trivially satisfied by the all-false assignment.
    pub fn solve(&self) -> Option<Assignment> {
        let clauses = self
            .instance
            .clauses()
            .map(|(_, literals)| {
                literals
                    .iter()
                    .map(|(var, negated)| self.literal(*var, *negated))
                    .collect_vec()
            })
            .collect_vec();

        let mut solver = Solver::new();
        solver.add_formula(&CnfFormula::from(clauses));
        if !solver.solve().is_ok_and(std::convert::identity) {
            return None;
        }
        let model = solver.model().unwrap_or_default();

        Some(
            self.variables
                .iter()
                .enumerate()
                .map(|(ind, id)| {
                    let value = model.get(ind).copied().map(Lit::is_positive).unwrap_or(false);
                    (*id, value)
                })
                .collect(),
        )
    }
}
