use std::collections::HashMap;

use strum::Display;
use unordered_pair::UnorderedPair;

use crate::error::Error;

/// Identifier of an element, unique within the registry that owns it.
pub type ElementId = usize;

/// Index of a solution group, used to pick a highlight color.
pub type GroupIndex = usize;

/// One literal of a clause: the id of a [`Element::Variable`] and whether it appears negated.
pub type Literal = (ElementId, bool);

/// The broad kind of an [`Element`], independent of its payload.
#[derive(Copy, Clone, Debug, Display, Eq, Hash, PartialEq)]
pub enum ElementKind {
    /// A graph vertex.
    Node,
    /// An undirected graph edge.
    Edge,
    /// A boolean variable of a formula.
    Variable,
    /// A 3-literal disjunction.
    Clause,
}

/// Highlight state of a single element, the only field mutated after construction.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Highlight {
    /// Not highlighted.
    #[default]
    None,
    /// Part of the current selection.
    Selected,
    /// Member of a solution group; the index selects the display color.
    Solution(GroupIndex),
}

/// A tagged element of one problem instance.
///
/// Structural payload is fixed at construction; only the highlight state kept
/// alongside it in the [`Registry`] ever changes.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Element {
    /// A graph vertex carrying its display name.
    Node {
        /// Identifier as written in the input, e.g. `X1`.
        name: String,
    },
    /// An undirected edge between two nodes of the same instance.
    Edge {
        /// The two endpoint node ids.
        endpoints: UnorderedPair<ElementId>,
    },
    /// A boolean variable shared by the clauses that mention it.
    Variable {
        /// Identifier as written in the input.
        name: String,
        /// Current truth value, if one has been assigned.
        value: Option<bool>,
    },
    /// A disjunction of exactly three literals.
    Clause {
        /// The literals in source order.
        literals: [Literal; 3],
    },
}

impl Element {
    /// The [`ElementKind`] of this element.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Node { .. } => ElementKind::Node,
            Self::Edge { .. } => ElementKind::Edge,
            Self::Variable { .. } => ElementKind::Variable,
            Self::Clause { .. } => ElementKind::Clause,
        }
    }

    /// The display name, for nodes and variables.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Node { name } | Self::Variable { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Insertion-ordered store of the elements of one instance.
///
/// The registry is the sole owner of its elements; every lookup and every
/// highlight mutation goes through it.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    elements: Vec<(ElementId, Element, Highlight)>,
    by_id: HashMap<ElementId, usize>,
    next_id: ElementId,
}

impl Registry {
    /// Add `element` under a fresh id and return that id.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = self.next_id;
        // cannot collide, next_id is never reused
        self.insert(id, element).unwrap();
        id
    }

    /// Add `element` under a caller-chosen `id`.
    ///
    /// Fails with [`Error::DuplicateId`] if the id is already present.
    pub fn insert(&mut self, id: ElementId, element: Element) -> Result<(), Error> {
        if self.by_id.contains_key(&id) {
            return Err(Error::DuplicateId(id));
        }

        self.by_id.insert(id, self.elements.len());
        self.elements.push((id, element, Highlight::None));
        self.next_id = self.next_id.max(id + 1);
        Ok(())
    }

    /// Look up the element stored under `id`.
    pub fn get(&self, id: ElementId) -> Result<&Element, Error> {
        self.by_id
            .get(&id)
            .map(|ind| &self.elements[*ind].1)
            .ok_or(Error::UnknownElement(id))
    }

    /// Whether `id` resolves to an element.
    pub fn contains(&self, id: ElementId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All elements with their ids, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements.iter().map(|(id, element, _)| (*id, element))
    }

    /// Ids of every element, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().map(|(id, ..)| *id)
    }

    /// Number of elements stored.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the registry holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Current highlight state of the element under `id`.
    pub fn highlight(&self, id: ElementId) -> Result<Highlight, Error> {
        self.by_id
            .get(&id)
            .map(|ind| self.elements[*ind].2)
            .ok_or(Error::UnknownElement(id))
    }

    /// Set the highlight state of the element under `id`.
    ///
    /// This is the only mutation a registry permits after construction.
    pub fn set_highlight(&mut self, id: ElementId, state: Highlight) -> Result<(), Error> {
        match self.by_id.get(&id) {
            Some(ind) => {
                self.elements[*ind].2 = state;
                Ok(())
            }
            None => Err(Error::UnknownElement(id)),
        }
    }

    /// Revert every element to [`Highlight::None`].
    pub fn clear_highlights(&mut self) {
        for (.., state) in self.elements.iter_mut() {
            *state = Highlight::None;
        }
    }
}
