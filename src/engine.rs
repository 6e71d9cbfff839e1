use std::collections::BTreeSet;

use tracing::debug;

use crate::element::{ElementId, Highlight};
use crate::error::Error;
use crate::problem;
use crate::reduction::{Reduction, TargetSolution};
use crate::solver::FormulaSolver;

/// Which of the two displayed instances an event refers to.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Panel {
    /// The source instance of the reduction.
    Source,
    /// The constructed target instance.
    Target,
}

impl Panel {
    /// The other panel.
    pub fn other(&self) -> Self {
        match self {
            Self::Source => Self::Target,
            Self::Target => Self::Source,
        }
    }
}

/// Current mode of a [`Session`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// Nothing highlighted.
    Idle,
    /// A set of elements in one panel is selected, with correspondents
    /// highlighted in the other panel.
    ElementSelected {
        /// The panel the selection was made in.
        panel: Panel,
        /// The selected element ids.
        ids: BTreeSet<ElementId>,
    },
    /// Solution groupings are overlaid on both panels.
    SolutionDisplayed,
}

/// One element's highlight state as handed to the renderer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ElementHighlight {
    /// The element.
    pub id: ElementId,
    /// Its highlight state.
    pub highlight: Highlight,
    /// Brightness in `[0, 1]`; fractional when only some of the element's
    /// correspondents are selected.
    pub intensity: f64,
}

/// Selection and solution-display state machine over a built [`Reduction`].
///
/// All highlight mutation funnels through the transition methods here; every
/// transition runs to completion and repeating a transition reproduces the
/// same highlight snapshot.
#[derive(Clone, Debug)]
pub struct Session {
    reduction: Reduction,
    state: SessionState,
}

impl From<Reduction> for Session {
    fn from(reduction: Reduction) -> Self {
        Self {
            reduction,
            state: SessionState::Idle,
        }
    }
}

impl Session {
    /// The reduction this session displays.
    pub fn reduction(&self) -> &Reduction {
        &self.reduction
    }

    /// The current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn instance(&self, panel: Panel) -> &crate::Instance {
        match panel {
            Panel::Source => self.reduction.source(),
            Panel::Target => self.reduction.target(),
        }
    }

    fn clear_highlights(&mut self) {
        self.reduction.source_mut().registry_mut().clear_highlights();
        self.reduction.target_mut().registry_mut().clear_highlights();
    }

    /// Process a click resolved to the element `id` in `panel`.
    ///
    /// Clicking the sole selected element again deselects it; any other click
    /// replaces the selection. Fails with [`Error::UnknownElement`] without
    /// touching any state if `id` does not resolve.
    pub fn click(&mut self, panel: Panel, id: ElementId) -> Result<(), Error> {
        self.instance(panel).registry().get(id)?;

        let reclicked = matches!(
            &self.state,
            SessionState::ElementSelected { panel: selected_panel, ids }
                if *selected_panel == panel && ids.len() == 1 && ids.contains(&id)
        );
        if reclicked {
            debug!(?panel, id, "deselected");
            self.clear_highlights();
            self.state = SessionState::Idle;
            return Ok(());
        }

        self.select_many(panel, [id])
    }

    /// Highlight a set of elements of one panel and propagate across the
    /// correspondence table.
    ///
    /// Selected source elements light all of their targets. In the other
    /// direction an element lights up only once *every* one of its
    /// correspondents is selected; partial coverage is reported as
    /// fractional intensity in the snapshot instead. An empty set clears the
    /// selection. Fails with [`Error::UnknownElement`] without touching any
    /// state if some id does not resolve.
    pub fn select_many(
        &mut self,
        panel: Panel,
        ids: impl IntoIterator<Item = ElementId>,
    ) -> Result<(), Error> {
        let ids: BTreeSet<ElementId> = ids.into_iter().collect();
        for id in &ids {
            self.instance(panel).registry().get(*id)?;
        }

        self.clear_highlights();
        if ids.is_empty() {
            self.state = SessionState::Idle;
            return Ok(());
        }

        let mut lit: Vec<(Panel, ElementId)> = ids.iter().map(|id| (panel, *id)).collect();
        match panel {
            Panel::Source => {
                // forward: a selected source element lights every node it produced
                for id in &ids {
                    if let Some(targets) = self.reduction.mapping().targets_of(*id) {
                        lit.extend(targets.iter().map(|target| (Panel::Target, *target)));
                    }
                }
            }
            Panel::Target => {
                // backward: a source element lights only under full coverage
                for entry in self.reduction.mapping().entries() {
                    if entry.targets.is_subset(&ids) {
                        lit.push((Panel::Source, entry.source));
                    }
                }
            }
        }

        for (lit_panel, id) in lit {
            let instance = match lit_panel {
                Panel::Source => self.reduction.source_mut(),
                Panel::Target => self.reduction.target_mut(),
            };
            instance.registry_mut().set_highlight(id, Highlight::Selected)?;
        }

        debug!(?panel, count = ids.len(), "selection applied");
        self.state = SessionState::ElementSelected { panel, ids };
        Ok(())
    }

    /// Toggle the solution overlay.
    ///
    /// Entering solution display solves the source formula, carries the
    /// assignment across the reduction, evaluates both sides, and highlights
    /// every element with its solution group. An unsatisfiable source leaves
    /// both panels unhighlighted. Toggling again clears back to idle.
    pub fn toggle_solution(&mut self) -> Result<(), Error> {
        self.clear_highlights();
        if self.state == SessionState::SolutionDisplayed {
            debug!("solution display cleared");
            self.state = SessionState::Idle;
            return Ok(());
        }

        self.state = SessionState::SolutionDisplayed;
        let assignment = match FormulaSolver::from(self.reduction.source()).solve() {
            Some(assignment) => assignment,
            None => {
                debug!("source formula unsatisfiable; nothing to display");
                return Ok(());
            }
        };

        let source_eval = problem::three_sat(self.reduction.source(), &assignment)?;
        let target_eval = match self.reduction.assignment_to_target(&assignment) {
            TargetSolution::IndependentSet(chosen) => {
                problem::independent_set(self.reduction.target(), &chosen)?
            }
            TargetSolution::Coloring(coloring) => {
                problem::three_coloring(self.reduction.target(), &coloring)?
            }
        };

        for (eval, panel) in [(source_eval, Panel::Source), (target_eval, Panel::Target)] {
            let Some(grouping) = eval.grouping else {
                continue;
            };
            let instance = match panel {
                Panel::Source => self.reduction.source_mut(),
                Panel::Target => self.reduction.target_mut(),
            };
            for (id, group) in grouping.iter() {
                instance.registry_mut().set_highlight(id, Highlight::Solution(group))?;
            }
        }

        debug!("solution display applied");
        Ok(())
    }

    /// Brightness of the element `id` in `panel`, in `[0, 1]`.
    ///
    /// Highlighted elements are at full intensity. An unhighlighted element
    /// with correspondents glows in proportion to how many of them are
    /// currently selected, so a clause brightens as more of its gadget nodes
    /// are picked.
    pub fn intensity(&self, panel: Panel, id: ElementId) -> Result<f64, Error> {
        let instance = self.instance(panel);
        if instance.registry().highlight(id)? != Highlight::None {
            return Ok(1.0);
        }

        let correspondents = match panel {
            Panel::Source => self.reduction.mapping().targets_of(id),
            Panel::Target => self.reduction.mapping().sources_of(id),
        };
        let Some(correspondents) = correspondents else {
            return Ok(0.0);
        };

        let other = self.instance(panel.other());
        let selected = correspondents
            .iter()
            .filter(|other_id| other.registry().highlight(**other_id) == Ok(Highlight::Selected))
            .count();
        Ok(selected as f64 / correspondents.len() as f64)
    }

    /// The full highlight state of one panel, in element insertion order.
    pub fn snapshot(&self, panel: Panel) -> Vec<ElementHighlight> {
        self.instance(panel)
            .registry()
            .ids()
            .map(|id| ElementHighlight {
                id,
                // both lookups cannot fail for ids the registry just yielded
                highlight: self.instance(panel).registry().highlight(id).unwrap_or_default(),
                intensity: self.intensity(panel, id).unwrap_or(0.0),
            })
            .collect()
    }
}
