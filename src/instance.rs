use std::collections::HashMap;

use petgraph::graphmap::UnGraphMap;
use strum::Display;
use unordered_pair::UnorderedPair;

use crate::element::{Element, ElementId, Literal, Registry};
use crate::error::Error;

/// The problem a given [`Instance`] is an instance of.
#[derive(Copy, Clone, Debug, Display, Eq, Hash, PartialEq)]
pub enum ProblemKind {
    /// A graph together with a target set size; solutions are independent sets.
    IndependentSet,
    /// A 3-CNF formula; solutions are truth assignments.
    ThreeSat,
    /// A graph; solutions are proper 3-colorings.
    ThreeColoring,
}

/// One problem instance: an element [`Registry`] plus a [`ProblemKind`] tag.
///
/// Structural content (nodes, edges, variables, clauses, layout groups) is
/// fixed once construction finishes; afterwards only highlight state changes,
/// and only through the [`Session`](crate::Session) owning this instance.
#[derive(Clone, Debug)]
pub struct Instance {
    kind: ProblemKind,
    registry: Registry,
    // adjacency index over node ids; edge weights are the edge element ids
    adjacency: UnGraphMap<ElementId, ElementId>,
    groups: Vec<Vec<ElementId>>,
    names: HashMap<String, ElementId>,
}

impl Instance {
    /// An empty instance of the given kind.
    pub fn new(kind: ProblemKind) -> Self {
        Self {
            kind,
            registry: Registry::default(),
            adjacency: UnGraphMap::new(),
            groups: Vec::new(),
            names: HashMap::new(),
        }
    }

    /// The problem kind this instance belongs to.
    pub fn kind(&self) -> ProblemKind {
        self.kind
    }

    /// The element registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Add a graph node with the given display name and return its id.
    ///
    /// Names need not be unique; reductions reuse gadget labels freely.
    /// [`Self::id_of`] resolves a name to its first occurrence.
    pub fn add_node(&mut self, name: impl Into<String>) -> ElementId {
        let name = name.into();
        let id = self.registry.add(Element::Node { name: name.clone() });
        self.adjacency.add_node(id);
        self.names.entry(name).or_insert(id);
        id
    }

    /// Add an undirected edge between the nodes `a` and `b` and return its id.
    ///
    /// Adding an edge that already exists returns the existing edge id.
    /// Fails with [`Error::UnknownElement`] if either endpoint is absent.
    pub fn add_edge(&mut self, a: ElementId, b: ElementId) -> Result<ElementId, Error> {
        self.registry.get(a)?;
        self.registry.get(b)?;

        if let Some(existing) = self.adjacency.edge_weight(a, b) {
            return Ok(*existing);
        }

        let id = self.registry.add(Element::Edge { endpoints: UnorderedPair(a, b) });
        self.adjacency.add_edge(a, b, id);
        Ok(id)
    }

    /// Add a boolean variable, or return the id of the existing variable of the same name.
    pub fn add_variable(&mut self, name: impl Into<String>) -> ElementId {
        let name = name.into();
        if let Some(id) = self.names.get(&name) {
            return *id;
        }

        let id = self.registry.add(Element::Variable { name: name.clone(), value: None });
        self.names.insert(name, id);
        id
    }

    /// Add a 3-literal clause over previously added variables and return its id.
    ///
    /// Fails with [`Error::UnknownElement`] if any referenced variable is absent.
    pub fn add_clause(&mut self, literals: [Literal; 3]) -> Result<ElementId, Error> {
        for (var, _) in literals {
            self.registry.get(var)?;
        }

        Ok(self.registry.add(Element::Clause { literals }))
    }

    /// Record a layout group; the renderer clusters grouped elements together.
    ///
    /// Fails with [`Error::UnknownElement`] if any member is absent.
    pub fn add_group(&mut self, members: Vec<ElementId>) -> Result<(), Error> {
        for id in &members {
            self.registry.get(*id)?;
        }

        self.groups.push(members);
        Ok(())
    }

    /// The layout groups in declaration order.
    pub fn groups(&self) -> &[Vec<ElementId>] {
        &self.groups
    }

    /// Resolve a node or variable display name to its id.
    pub fn id_of(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    /// Whether an edge connects the nodes `a` and `b`.
    pub fn has_edge(&self, a: ElementId, b: ElementId) -> bool {
        self.adjacency.contains_edge(a, b)
    }

    /// Node ids adjacent to `id`.
    pub fn neighbors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.adjacency.neighbors(id)
    }

    /// All node ids, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.registry.all().filter_map(|(id, element)| match element {
            Element::Node { .. } => Some(id),
            _ => None,
        })
    }

    /// All edges as `(edge id, endpoints)`, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (ElementId, UnorderedPair<ElementId>)> + '_ {
        self.registry.all().filter_map(|(id, element)| match element {
            Element::Edge { endpoints } => Some((id, *endpoints)),
            _ => None,
        })
    }

    /// All variable ids, in insertion order.
    pub fn variable_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.registry.all().filter_map(|(id, element)| match element {
            Element::Variable { .. } => Some(id),
            _ => None,
        })
    }

    /// All clauses as `(clause id, literals)`, in insertion order.
    pub fn clauses(&self) -> impl Iterator<Item = (ElementId, [Literal; 3])> + '_ {
        self.registry.all().filter_map(|(id, element)| match element {
            Element::Clause { literals } => Some((id, *literals)),
            _ => None,
        })
    }
}
