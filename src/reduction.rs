use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use strum::{Display, VariantArray};
use tracing::debug;

use crate::element::{Element, ElementId, GroupIndex};
use crate::error::Error;
use crate::instance::{Instance, ProblemKind};
use crate::problem::{Assignment, Coloring, Selection};

/// The reductions this crate can construct.
#[derive(Copy, Clone, Debug, Display, Eq, Hash, PartialEq, VariantArray)]
pub enum ReductionKind {
    /// Clause triangles plus complementary-literal edges; independent sets of
    /// size = clause count correspond to satisfying assignments.
    ThreeSatToIndependentSet,
    /// Shared Base/True/False triangle, per-variable literal pairs, and two
    /// chained OR gadgets per clause; proper 3-colorings correspond to
    /// satisfying assignments.
    ThreeSatToThreeColoring,
}

impl ReductionKind {
    /// The problem kind a source instance must have.
    pub fn source_kind(&self) -> ProblemKind {
        ProblemKind::ThreeSat
    }

    /// The problem kind of the constructed target instance.
    pub fn target_kind(&self) -> ProblemKind {
        match self {
            Self::ThreeSatToIndependentSet => ProblemKind::IndependentSet,
            Self::ThreeSatToThreeColoring => ProblemKind::ThreeColoring,
        }
    }
}

/// One row of a [`ReductionMapping`]: a source element and every target
/// element it was transformed into.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CorrespondenceEntry {
    /// The source-instance element.
    pub source: ElementId,
    /// The target-instance elements it produced, in id order.
    pub targets: BTreeSet<ElementId>,
}

/// Bidirectional correspondence table between a source and a target instance.
///
/// Built once during [`Reduction::build`] and immutable afterwards.
#[derive(Clone, Debug, Default)]
pub struct ReductionMapping {
    entries: Vec<CorrespondenceEntry>,
    // entry index per source id, for appending during construction
    entry_index: HashMap<ElementId, usize>,
    backward: HashMap<ElementId, BTreeSet<ElementId>>,
}

impl ReductionMapping {
    fn add_pair(&mut self, source: ElementId, target: ElementId) {
        let ind = *self.entry_index.entry(source).or_insert_with(|| {
            self.entries.push(CorrespondenceEntry {
                source,
                targets: BTreeSet::new(),
            });
            self.entries.len() - 1
        });
        self.entries[ind].targets.insert(target);
        self.backward.entry(target).or_default().insert(source);
    }

    /// All entries, ordered by first appearance of their source element.
    pub fn entries(&self) -> &[CorrespondenceEntry] {
        &self.entries
    }

    /// Target elements the source element `id` was transformed into.
    pub fn targets_of(&self, id: ElementId) -> Option<&BTreeSet<ElementId>> {
        self.entry_index.get(&id).map(|ind| &self.entries[*ind].targets)
    }

    /// Source elements the target element `id` originated from.
    pub fn sources_of(&self, id: ElementId) -> Option<&BTreeSet<ElementId>> {
        self.backward.get(&id)
    }

    /// Check that every id in the table resolves in its instance.
    ///
    /// A failure here is a bug in a reduction builder, not a user error.
    pub fn validate(&self, source: &Instance, target: &Instance) -> Result<(), Error> {
        for entry in &self.entries {
            if !source.registry().contains(entry.source) {
                return Err(Error::DanglingCorrespondence(entry.source));
            }
            if let Some(missing) = entry.targets.iter().find(|id| !target.registry().contains(**id)) {
                return Err(Error::DanglingCorrespondence(*missing));
            }
        }

        Ok(())
    }
}

// Construction indexes retained per reduction kind so solutions can be
// carried across the mapping in either direction.
#[derive(Clone, Debug)]
enum Gadgets {
    IndependentSet {
        // per clause in insertion order, the literal-occurrence node per literal
        literal_nodes: Vec<[ElementId; 3]>,
    },
    ThreeColoring {
        base: ElementId,
        truth: ElementId,
        falsity: ElementId,
        // variable id -> (positive literal node, negative literal node)
        var_nodes: BTreeMap<ElementId, (ElementId, ElementId)>,
        // per clause in insertion order: [g1, g2, out] of both OR gadgets
        clause_gadgets: Vec<[ElementId; 6]>,
    },
}

/// A solution to the target instance, expressed in that problem's vocabulary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TargetSolution {
    /// A claimed independent set.
    IndependentSet(Selection),
    /// A claimed 3-coloring.
    Coloring(Coloring),
}

/// A built reduction: the source instance, the target instance constructed
/// from it, and the correspondence table relating the two.
#[derive(Clone, Debug)]
pub struct Reduction {
    kind: ReductionKind,
    source: Instance,
    target: Instance,
    mapping: ReductionMapping,
    gadgets: Gadgets,
}

// color classes are handed off as [true, false, base]
const CLASS_TRUE: GroupIndex = 0;
const CLASS_FALSE: GroupIndex = 1;
const CLASS_BASE: GroupIndex = 2;

impl Reduction {
    /// Construct the target instance and correspondence table for `kind`.
    ///
    /// Deterministic: rebuilding from the same source reproduces identical
    /// ids and mapping. Fails with [`Error::UnsupportedReduction`] if the
    /// source kind has no registered construction, before any target state
    /// exists.
    pub fn build(kind: ReductionKind, source: Instance) -> Result<Self, Error> {
        if source.kind() != kind.source_kind() {
            return Err(Error::UnsupportedReduction(source.kind()));
        }

        let built = match kind {
            ReductionKind::ThreeSatToIndependentSet => Self::build_independent_set(source)?,
            ReductionKind::ThreeSatToThreeColoring => Self::build_three_coloring(source)?,
        };
        built.mapping.validate(&built.source, &built.target)?;
        debug!(
            %kind,
            target_elements = built.target.registry().len(),
            entries = built.mapping.entries().len(),
            "reduction built"
        );
        Ok(built)
    }

    fn label(source: &Instance, var: ElementId, negated: bool) -> Result<String, Error> {
        match source.registry().get(var)? {
            Element::Variable { name, .. } => Ok(match negated {
                true => format!("¬{name}"),
                false => name.clone(),
            }),
            _ => Err(Error::UnknownElement(var)),
        }
    }

    fn build_independent_set(source: Instance) -> Result<Self, Error> {
        let mut target = Instance::new(ProblemKind::IndependentSet);
        let mut mapping = ReductionMapping::default();
        let mut literal_nodes = Vec::new();
        // every literal occurrence in creation order, for complementary edges
        let mut occurrences: Vec<(ElementId, bool, ElementId)> = Vec::new();

        for (clause, literals) in source.clauses().collect_vec() {
            let mut triangle = [0; 3];
            for (ind, (var, negated)) in literals.into_iter().enumerate() {
                let node = target.add_node(Self::label(&source, var, negated)?);
                mapping.add_pair(clause, node);
                mapping.add_pair(var, node);
                occurrences.push((var, negated, node));
                triangle[ind] = node;
            }

            // at most one literal of a clause can enter an independent set
            for (a, b) in triangle.iter().tuple_combinations() {
                target.add_edge(*a, *b)?;
            }
            target.add_group(triangle.to_vec())?;
            literal_nodes.push(triangle);
        }

        // a literal and its negation can never both be chosen
        for (first, second) in occurrences.iter().tuple_combinations() {
            if first.0 == second.0 && first.1 != second.1 {
                target.add_edge(first.2, second.2)?;
            }
        }

        Ok(Self {
            kind: ReductionKind::ThreeSatToIndependentSet,
            source,
            target,
            mapping,
            gadgets: Gadgets::IndependentSet { literal_nodes },
        })
    }

    fn build_three_coloring(source: Instance) -> Result<Self, Error> {
        let mut target = Instance::new(ProblemKind::ThreeColoring);
        let mut mapping = ReductionMapping::default();

        let base = target.add_node("Base");
        let truth = target.add_node("True");
        let falsity = target.add_node("False");
        for (a, b) in [(base, truth), (truth, falsity), (falsity, base)] {
            target.add_edge(a, b)?;
        }
        target.add_group(vec![base, truth, falsity])?;

        let mut var_nodes = BTreeMap::new();
        for var in source.variable_ids().collect_vec() {
            let positive = target.add_node(Self::label(&source, var, false)?);
            let negative = target.add_node(Self::label(&source, var, true)?);
            target.add_edge(positive, negative)?;
            target.add_edge(positive, base)?;
            target.add_edge(negative, base)?;
            target.add_group(vec![positive, negative])?;

            mapping.add_pair(var, positive);
            mapping.add_pair(var, negative);
            var_nodes.insert(var, (positive, negative));
        }

        let mut clause_gadgets = Vec::new();
        for (clause, literals) in source.clauses().collect_vec() {
            let inputs = literals.map(|(var, negated)| {
                let (positive, negative) = var_nodes[&var];
                match negated {
                    true => negative,
                    false => positive,
                }
            });

            // OR(l1, l2), then OR(that, l3); the final output must color True
            let first = Self::or_gadget(&mut target, inputs[0], inputs[1])?;
            let second = Self::or_gadget(&mut target, first[2], inputs[2])?;
            target.add_edge(second[2], base)?;
            target.add_edge(second[2], falsity)?;

            let gadget = [first[0], first[1], first[2], second[0], second[1], second[2]];
            for node in gadget {
                mapping.add_pair(clause, node);
            }
            clause_gadgets.push(gadget);
        }

        Ok(Self {
            kind: ReductionKind::ThreeSatToThreeColoring,
            source,
            target,
            mapping,
            gadgets: Gadgets::ThreeColoring {
                base,
                truth,
                falsity,
                var_nodes,
                clause_gadgets,
            },
        })
    }

    // 3-node OR gadget: inputs a, b feed g1, g2; (g1, g2, out) is a triangle.
    // Returns [g1, g2, out].
    fn or_gadget(target: &mut Instance, a: ElementId, b: ElementId) -> Result<[ElementId; 3], Error> {
        let g1 = target.add_node("in1");
        let g2 = target.add_node("in2");
        let out = target.add_node("out");

        target.add_edge(g1, a)?;
        target.add_edge(g2, b)?;
        target.add_edge(g1, g2)?;
        target.add_edge(g2, out)?;
        target.add_edge(out, g1)?;
        target.add_group(vec![g1, g2, out])?;

        Ok([g1, g2, out])
    }

    /// Which reduction this is.
    pub fn kind(&self) -> ReductionKind {
        self.kind
    }

    /// The source instance.
    pub fn source(&self) -> &Instance {
        &self.source
    }

    /// The constructed target instance.
    pub fn target(&self) -> &Instance {
        &self.target
    }

    /// The correspondence table.
    pub fn mapping(&self) -> &ReductionMapping {
        &self.mapping
    }

    pub(crate) fn source_mut(&mut self) -> &mut Instance {
        &mut self.source
    }

    pub(crate) fn target_mut(&mut self) -> &mut Instance {
        &mut self.target
    }

    /// For the independent-set target, the required set size (= clause count).
    pub fn target_set_size(&self) -> Option<usize> {
        match &self.gadgets {
            Gadgets::IndependentSet { literal_nodes } => Some(literal_nodes.len()),
            _ => None,
        }
    }

    /// Carry a satisfying assignment of the source formula over to the target.
    ///
    /// For the independent-set target this picks the node of the first
    /// satisfied literal of each clause; for the coloring target it colors
    /// the base triangle, both literal nodes of every variable, and the OR
    /// gadget interiors from the truth values of each clause's literals.
    pub fn assignment_to_target(&self, assignment: &Assignment) -> TargetSolution {
        let value_of = |var: ElementId| assignment.get(&var).copied().unwrap_or(false);

        match &self.gadgets {
            Gadgets::IndependentSet { literal_nodes } => {
                let mut chosen = Selection::new();
                for ((_, literals), triangle) in self.source.clauses().zip(literal_nodes) {
                    let satisfied = literals
                        .iter()
                        .position(|(var, negated)| value_of(*var) != *negated);
                    // an unsatisfied clause contributes nothing
                    if let Some(ind) = satisfied {
                        chosen.insert(triangle[ind]);
                    }
                }

                TargetSolution::IndependentSet(chosen)
            }
            Gadgets::ThreeColoring {
                base,
                truth,
                falsity,
                var_nodes,
                clause_gadgets,
            } => {
                let mut coloring = Coloring::new();
                coloring.insert(*truth, CLASS_TRUE);
                coloring.insert(*falsity, CLASS_FALSE);
                coloring.insert(*base, CLASS_BASE);

                for (var, (positive, negative)) in var_nodes {
                    let (pos_class, neg_class) = match value_of(*var) {
                        true => (CLASS_TRUE, CLASS_FALSE),
                        false => (CLASS_FALSE, CLASS_TRUE),
                    };
                    coloring.insert(*positive, pos_class);
                    coloring.insert(*negative, neg_class);
                }

                for ((_, literals), gadget) in self.source.clauses().zip(clause_gadgets) {
                    let [v1, v2, v3] = literals.map(|(var, negated)| value_of(var) != negated);
                    let (first, second) = or_gadget_classes(v1, v2, v3);
                    for (node, class) in gadget.iter().zip(first.into_iter().chain(second)) {
                        coloring.insert(*node, class);
                    }
                }

                TargetSolution::Coloring(coloring)
            }
        }
    }

    /// Recover a total truth assignment from a target solution.
    ///
    /// Selected literal-occurrence nodes (or positive literal nodes colored
    /// true) force their variable; every other variable defaults to false.
    pub fn target_to_assignment(&self, solution: &TargetSolution) -> Assignment {
        let mut assignment: Assignment = self.source.variable_ids().map(|var| (var, false)).collect();

        match (&self.gadgets, solution) {
            (Gadgets::IndependentSet { literal_nodes }, TargetSolution::IndependentSet(chosen)) => {
                for ((_, literals), triangle) in self.source.clauses().zip(literal_nodes) {
                    for (&(var, negated), node) in literals.iter().zip(triangle) {
                        if chosen.contains(node) {
                            assignment.insert(var, !negated);
                        }
                    }
                }
            }
            (Gadgets::ThreeColoring { var_nodes, .. }, TargetSolution::Coloring(coloring)) => {
                for (var, (positive, _)) in var_nodes {
                    assignment.insert(*var, coloring.get(positive) == Some(&CLASS_TRUE));
                }
            }
            // vocabulary mismatch contributes nothing; defaults remain
            _ => {}
        }

        assignment
    }
}

// Color classes for the six gadget nodes given the clause's literal truth
// values, as ([g1, g2, out] of OR(l1, l2), [g1, g2, out] of OR(out12, l3)).
fn or_gadget_classes(v1: bool, v2: bool, v3: bool) -> ([GroupIndex; 3], [GroupIndex; 3]) {
    const T: GroupIndex = CLASS_TRUE;
    const F: GroupIndex = CLASS_FALSE;
    const B: GroupIndex = CLASS_BASE;

    match (v1, v2, v3) {
        (false, false, false) => ([B, T, F], [B, B, T]),
        (false, false, true) => ([B, T, F], [B, F, T]),
        (false, true, false) => ([B, F, T], [F, B, T]),
        (false, true, true) => ([T, B, F], [B, F, T]),
        (true, false, false) => ([F, T, B], [F, B, T]),
        (true, false, true) => ([B, T, F], [B, F, T]),
        (true, true, false) => ([B, F, T], [F, B, T]),
        (true, true, true) => ([B, F, T], [B, F, T]),
    }
}
