#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use strum::VariantArray;

    use crate::element::{Element, Highlight};
    use crate::engine::{Panel, Session, SessionState};
    use crate::error::{Error, ParseError};
    use crate::instance::{Instance, ProblemKind};
    use crate::parse;
    use crate::problem::{self, Assignment, Selection};
    use crate::reduction::{Reduction, ReductionKind, TargetSolution};
    use crate::solver::FormulaSolver;

    const TWO_CLAUSES: &str = "(X1 OR NOT X2 OR X3) AND (NOT X1 OR X2 OR X4)";

    fn formula(text: &str) -> Instance {
        parse::formula(text).unwrap()
    }

    fn session(kind: ReductionKind, text: &str) -> Session {
        Session::from(Reduction::build(kind, formula(text)).unwrap())
    }

    fn unsat_formula() -> Instance {
        // all eight sign patterns over three variables
        let mut instance = Instance::new(ProblemKind::ThreeSat);
        let vars = ["X1", "X2", "X3"].map(|name| instance.add_variable(name));
        for bits in 0..8u8 {
            instance
                .add_clause([
                    (vars[0], bits & 1 != 0),
                    (vars[1], bits & 2 != 0),
                    (vars[2], bits & 4 != 0),
                ])
                .unwrap();
        }
        instance
    }

    #[test]
    fn parse_graph_roundtrip() {
        let instance = parse::graph(
            ProblemKind::IndependentSet,
            "X1\nX2\nX3\n(X1, X2)\n(X2, X3)\n[X1, X2]\n",
        )
        .unwrap();

        assert_eq!(instance.node_ids().count(), 3);
        assert_eq!(instance.edges().count(), 2);
        let (x1, x2, x3) = (
            instance.id_of("X1").unwrap(),
            instance.id_of("X2").unwrap(),
            instance.id_of("X3").unwrap(),
        );
        assert!(instance.has_edge(x1, x2));
        assert!(instance.has_edge(x2, x3));
        assert!(!instance.has_edge(x1, x3));
        assert_eq!(instance.groups(), &[vec![x1, x2]]);
    }

    #[test]
    fn parse_graph_rejects_unknown_identifier() {
        let result = parse::graph(ProblemKind::IndependentSet, "X1\n(X1, X9)\n");
        assert_eq!(
            result.unwrap_err(),
            Error::Parse(ParseError::UnknownIdentifier {
                line: 2,
                name: "X9".to_owned(),
            })
        );
    }

    #[test]
    fn parse_graph_rejects_duplicate_node() {
        let result = parse::graph(ProblemKind::IndependentSet, "X1\nX1\n");
        assert_eq!(
            result.unwrap_err(),
            Error::Parse(ParseError::DuplicateIdentifier {
                line: 2,
                name: "X1".to_owned(),
            })
        );
    }

    #[test]
    fn parse_formula_shares_variables() {
        let instance = formula(TWO_CLAUSES);

        assert_eq!(instance.variable_ids().count(), 4);
        assert_eq!(instance.clauses().count(), 2);

        let x1 = instance.id_of("X1").unwrap();
        let clauses = instance.clauses().collect::<Vec<_>>();
        assert_eq!(clauses[0].1[0], (x1, false));
        assert_eq!(clauses[1].1[0], (x1, true));
    }

    #[test]
    fn parse_formula_rejects_short_clause() {
        assert_eq!(
            parse::formula("X1 OR X2").unwrap_err(),
            Error::Parse(ParseError::ClauseArity { clause: 1, found: 2 })
        );
    }

    #[test]
    fn parse_formula_rejects_dangling_or() {
        assert!(matches!(
            parse::formula("X1 OR NOT X2 OR").unwrap_err(),
            Error::Parse(ParseError::MalformedLine { .. })
        ));
    }

    #[test]
    fn registry_rejects_duplicate_and_unknown_ids() {
        let mut instance = Instance::new(ProblemKind::IndependentSet);
        let node = instance.add_node("A");

        let clash = instance.registry_mut().insert(
            node,
            Element::Node {
                name: "B".to_owned(),
            },
        );
        assert_eq!(clash.unwrap_err(), Error::DuplicateId(node));
        assert_eq!(instance.registry().get(999).unwrap_err(), Error::UnknownElement(999));
    }

    #[test]
    fn independent_set_on_single_edge() {
        let mut instance = Instance::new(ProblemKind::IndependentSet);
        let a = instance.add_node("A");
        let b = instance.add_node("B");
        instance.add_edge(a, b).unwrap();

        let both = Selection::from([a, b]);
        let result = problem::independent_set(&instance, &both).unwrap();
        assert!(!result.valid);
        assert!(result.grouping.is_none());

        let one = Selection::from([a]);
        let result = problem::independent_set(&instance, &one).unwrap();
        assert!(result.valid);
        let grouping = result.grouping.unwrap();
        assert_eq!(grouping.group_of(a), Some(0));
        assert_eq!(grouping.group_of(b), Some(1));
    }

    #[test]
    fn three_sat_single_clause_cases() {
        let instance = formula("X1 OR NOT X2 OR X3");
        let x2 = instance.id_of("X2").unwrap();

        // all false: NOT X2 carries the clause
        let all_false = Assignment::new();
        assert!(problem::three_sat(&instance, &all_false).unwrap().valid);

        let x2_true = Assignment::from([(x2, true)]);
        let result = problem::three_sat(&instance, &x2_true).unwrap();
        assert!(!result.valid);
        assert!(result.grouping.is_none());
    }

    #[test]
    fn three_coloring_on_triangle() {
        let mut instance = Instance::new(ProblemKind::ThreeColoring);
        let nodes = ["A", "B", "C"].map(|name| instance.add_node(name));
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            instance.add_edge(nodes[a], nodes[b]).unwrap();
        }

        let proper = nodes.iter().zip(0..3).map(|(id, color)| (*id, color)).collect();
        assert!(problem::three_coloring(&instance, &proper).unwrap().valid);

        let clash = nodes.iter().map(|id| (*id, 0)).collect();
        assert!(!problem::three_coloring(&instance, &clash).unwrap().valid);
    }

    #[test]
    fn unsupported_source_kind_is_rejected() {
        let graph = parse::graph(ProblemKind::IndependentSet, "X1\n").unwrap();
        assert_eq!(
            Reduction::build(ReductionKind::ThreeSatToIndependentSet, graph).unwrap_err(),
            Error::UnsupportedReduction(ProblemKind::IndependentSet)
        );
    }

    #[test]
    fn independent_set_reduction_structure() {
        let reduction =
            Reduction::build(ReductionKind::ThreeSatToIndependentSet, formula(TWO_CLAUSES)).unwrap();
        let target = reduction.target();

        // one triangle node per literal occurrence
        assert_eq!(target.node_ids().count(), 6);
        assert_eq!(reduction.target_set_size(), Some(2));
        // two triangles plus the complementary X1/¬X1 and X2/¬X2 edges
        assert_eq!(target.edges().count(), 8);
        assert_eq!(target.groups().len(), 2);

        let source = reduction.source();
        for (clause, _) in source.clauses() {
            assert_eq!(reduction.mapping().targets_of(clause).unwrap().len(), 3);
        }
        // X1 appears in both clauses, X4 in one
        let x1 = source.id_of("X1").unwrap();
        let x4 = source.id_of("X4").unwrap();
        assert_eq!(reduction.mapping().targets_of(x1).unwrap().len(), 2);
        assert_eq!(reduction.mapping().targets_of(x4).unwrap().len(), 1);
    }

    #[test]
    fn coloring_reduction_structure() {
        let reduction =
            Reduction::build(ReductionKind::ThreeSatToThreeColoring, formula(TWO_CLAUSES)).unwrap();
        let target = reduction.target();
        let source = reduction.source();

        // base triangle + 2 nodes per variable + 6 gadget nodes per clause
        assert_eq!(target.node_ids().count(), 3 + 2 * 4 + 6 * 2);
        for var in source.variable_ids() {
            assert_eq!(reduction.mapping().targets_of(var).unwrap().len(), 2);
        }
        for (clause, _) in source.clauses() {
            assert_eq!(reduction.mapping().targets_of(clause).unwrap().len(), 6);
        }
    }

    #[test]
    fn mapping_is_complete_and_well_formed() {
        for &kind in ReductionKind::VARIANTS {
            let reduction = Reduction::build(kind, formula(TWO_CLAUSES)).unwrap();
            reduction
                .mapping()
                .validate(reduction.source(), reduction.target())
                .unwrap();

            // every variable and clause of the source is mapped; edges of the
            // target are structural and carry no entry of their own
            for (id, element) in reduction.source().registry().all() {
                match element {
                    Element::Variable { .. } | Element::Clause { .. } => {
                        assert!(reduction.mapping().targets_of(id).is_some(), "{kind}: {id} unmapped")
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn reduction_build_is_deterministic() {
        for &kind in ReductionKind::VARIANTS {
            let first = Reduction::build(kind, formula(TWO_CLAUSES)).unwrap();
            let second = Reduction::build(kind, formula(TWO_CLAUSES)).unwrap();

            assert_eq!(first.mapping().entries(), second.mapping().entries());
            assert_eq!(
                first.target().registry().all().collect::<Vec<_>>(),
                second.target().registry().all().collect::<Vec<_>>(),
            );
        }
    }

    #[test]
    fn solver_finds_satisfying_assignment() {
        let instance = formula(TWO_CLAUSES);
        let assignment = FormulaSolver::from(&instance).solve().unwrap();
        assert!(problem::three_sat(&instance, &assignment).unwrap().valid);
    }

    #[test]
    fn solver_reports_unsatisfiable() {
        assert_eq!(FormulaSolver::from(&unsat_formula()).solve(), None);
    }

    #[test]
    fn assignment_transfers_to_independent_set() {
        let reduction =
            Reduction::build(ReductionKind::ThreeSatToIndependentSet, formula(TWO_CLAUSES)).unwrap();
        let assignment = FormulaSolver::from(reduction.source()).solve().unwrap();

        let TargetSolution::IndependentSet(chosen) = reduction.assignment_to_target(&assignment)
        else {
            panic!("wrong target vocabulary");
        };
        assert_eq!(chosen.len(), reduction.target_set_size().unwrap());
        assert!(problem::independent_set(reduction.target(), &chosen).unwrap().valid);

        let recovered =
            reduction.target_to_assignment(&TargetSolution::IndependentSet(chosen));
        assert!(problem::three_sat(reduction.source(), &recovered).unwrap().valid);
    }

    #[test]
    fn assignment_transfers_to_coloring() {
        let reduction =
            Reduction::build(ReductionKind::ThreeSatToThreeColoring, formula(TWO_CLAUSES)).unwrap();
        let assignment = FormulaSolver::from(reduction.source()).solve().unwrap();

        let TargetSolution::Coloring(coloring) = reduction.assignment_to_target(&assignment) else {
            panic!("wrong target vocabulary");
        };
        // every node of the target is colored
        assert_eq!(coloring.len(), reduction.target().node_ids().count());
        assert!(problem::three_coloring(reduction.target(), &coloring).unwrap().valid);

        let recovered = reduction.target_to_assignment(&TargetSolution::Coloring(coloring));
        assert!(problem::three_sat(reduction.source(), &recovered).unwrap().valid);
    }

    #[test]
    fn click_highlights_correspondents() {
        let mut session = session(ReductionKind::ThreeSatToIndependentSet, TWO_CLAUSES);
        let (clause, _) = session.reduction().source().clauses().next().unwrap();
        let triangle = session.reduction().mapping().targets_of(clause).unwrap().clone();

        session.click(Panel::Source, clause).unwrap();

        assert_eq!(
            session.reduction().source().registry().highlight(clause),
            Ok(Highlight::Selected)
        );
        for entry in session.snapshot(Panel::Target) {
            let expected = match triangle.contains(&entry.id) {
                true => Highlight::Selected,
                false => Highlight::None,
            };
            assert_eq!(entry.highlight, expected);
        }
    }

    #[test]
    fn reclick_restores_previous_snapshot() {
        let mut session = session(ReductionKind::ThreeSatToIndependentSet, TWO_CLAUSES);
        let (clause, _) = session.reduction().source().clauses().next().unwrap();
        let before = (session.snapshot(Panel::Source), session.snapshot(Panel::Target));

        session.click(Panel::Source, clause).unwrap();
        session.click(Panel::Source, clause).unwrap();

        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(
            (session.snapshot(Panel::Source), session.snapshot(Panel::Target)),
            before
        );
    }

    #[test]
    fn click_transition_is_idempotent() {
        let mut session = session(ReductionKind::ThreeSatToIndependentSet, TWO_CLAUSES);
        let (clause, _) = session.reduction().source().clauses().next().unwrap();

        session.click(Panel::Source, clause).unwrap();
        let first = (session.snapshot(Panel::Source), session.snapshot(Panel::Target));

        // deselect, then repeat the same transition from idle
        session.click(Panel::Source, clause).unwrap();
        session.click(Panel::Source, clause).unwrap();
        let second = (session.snapshot(Panel::Source), session.snapshot(Panel::Target));

        assert_eq!(first, second);
    }

    #[test]
    fn click_on_unknown_id_fails_without_state_change() {
        let mut session = session(ReductionKind::ThreeSatToIndependentSet, TWO_CLAUSES);
        assert_eq!(
            session.click(Panel::Target, 9999).unwrap_err(),
            Error::UnknownElement(9999)
        );
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn full_coverage_lights_the_source_element() {
        let mut session = session(ReductionKind::ThreeSatToIndependentSet, TWO_CLAUSES);
        let (clause, _) = session.reduction().source().clauses().next().unwrap();
        let triangle = session.reduction().mapping().targets_of(clause).unwrap().clone();

        // one corner only: the clause stays dark but glows at 1/3
        let corner = *triangle.iter().next().unwrap();
        session.select_many(Panel::Target, [corner]).unwrap();
        assert_eq!(
            session.reduction().source().registry().highlight(clause),
            Ok(Highlight::None)
        );
        let partial = session.intensity(Panel::Source, clause).unwrap();
        assert!((partial - 1.0 / 3.0).abs() < 1e-9);

        session.select_many(Panel::Target, triangle.iter().copied()).unwrap();
        assert_eq!(
            session.reduction().source().registry().highlight(clause),
            Ok(Highlight::Selected)
        );
        assert_eq!(session.intensity(Panel::Source, clause), Ok(1.0));
    }

    #[test]
    fn clause_brightness_grows_with_selected_gadget_nodes() {
        let mut session = session(ReductionKind::ThreeSatToThreeColoring, TWO_CLAUSES);
        let (clause, _) = session.reduction().source().clauses().next().unwrap();
        let gadget: Vec<_> = session
            .reduction()
            .mapping()
            .targets_of(clause)
            .unwrap()
            .iter()
            .copied()
            .collect();
        assert_eq!(gadget.len(), 6);

        session
            .select_many(Panel::Target, gadget.iter().copied().take(3))
            .unwrap();
        let three_selected = session.intensity(Panel::Source, clause).unwrap();

        session.select_many(Panel::Target, gadget.iter().copied()).unwrap();
        let six_selected = session.intensity(Panel::Source, clause).unwrap();

        assert!(three_selected > 0.0 && three_selected <= 1.0);
        assert!(six_selected <= 1.0);
        assert!(six_selected > three_selected);
    }

    #[test]
    fn solution_toggle_overlays_groups_and_restores() {
        let mut session = session(ReductionKind::ThreeSatToIndependentSet, TWO_CLAUSES);
        let before = (session.snapshot(Panel::Source), session.snapshot(Panel::Target));

        session.toggle_solution().unwrap();
        assert_eq!(session.state(), &SessionState::SolutionDisplayed);

        let chosen: BTreeSet<_> = session
            .snapshot(Panel::Target)
            .into_iter()
            .filter(|entry| entry.highlight == Highlight::Solution(0))
            .map(|entry| entry.id)
            .collect();
        assert_eq!(chosen.len(), session.reduction().target_set_size().unwrap());
        assert!(problem::independent_set(session.reduction().target(), &chosen).unwrap().valid);

        session.toggle_solution().unwrap();
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(
            (session.snapshot(Panel::Source), session.snapshot(Panel::Target)),
            before
        );
    }

    #[test]
    fn solution_toggle_on_unsatisfiable_source_shows_nothing() {
        let reduction =
            Reduction::build(ReductionKind::ThreeSatToIndependentSet, unsat_formula()).unwrap();
        let mut session = Session::from(reduction);

        session.toggle_solution().unwrap();
        assert_eq!(session.state(), &SessionState::SolutionDisplayed);
        for panel in [Panel::Source, Panel::Target] {
            assert!(session
                .snapshot(panel)
                .iter()
                .all(|entry| entry.highlight == Highlight::None));
        }

        session.toggle_solution().unwrap();
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn selection_clears_when_solution_is_shown() {
        let mut session = session(ReductionKind::ThreeSatToThreeColoring, TWO_CLAUSES);
        let (clause, _) = session.reduction().source().clauses().next().unwrap();

        session.click(Panel::Source, clause).unwrap();
        session.toggle_solution().unwrap();

        assert!(session
            .snapshot(Panel::Source)
            .iter()
            .all(|entry| entry.highlight != Highlight::Selected));
    }
}
