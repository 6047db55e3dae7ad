//! Compiled form of query patterns.
//!
//! Captures and fields are pushed down onto node elements during
//! compilation, so only [`NodeElement`]s ever carry them.

use tessel_table::{FieldId, SymbolId};

use crate::predicate::{QueryPredicate, TextPredicate};

/// Index into the query's capture names.
pub type CaptureId = u32;

/// What a node element accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeTest {
    /// Bare `_`: any node, named or not.
    Any,
    /// `(_)`
    AnyNamed,
    /// A named kind or a literal token, possibly under several ids.
    Kinds(Vec<SymbolId>),
    /// `(ERROR)`
    Error,
    /// `(MISSING ...)`: no tree contains missing nodes.
    Never,
}

impl NodeTest {
    pub(crate) fn kinds(&self) -> Option<&[SymbolId]> {
        match self {
            NodeTest::Kinds(ids) => Some(ids),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeElement {
    pub test: NodeTest,
    pub field: Option<FieldId>,
    /// `None` leaves the children unconstrained.
    pub children: Option<Seq>,
    pub negated_fields: Vec<FieldId>,
    pub captures: Vec<CaptureId>,
}

#[derive(Debug, Clone)]
pub(crate) enum Element {
    Node(NodeElement),
    Alt(Vec<Seq>),
    /// `?` is `0..=1`, `*` is `0..`, `+` is `1..`.
    Repeat {
        body: Seq,
        min: u32,
        max: Option<u32>,
    },
    /// `.`: no named sibling may sit between its neighbours.
    Anchor,
}

pub(crate) type Seq = Vec<Element>;

impl Element {
    /// Calls `f` on every node element reachable from here without
    /// entering a node's children.
    pub(crate) fn for_each_node_mut(&mut self, f: &mut impl FnMut(&mut NodeElement)) {
        match self {
            Element::Node(node) => f(node),
            Element::Alt(branches) => {
                for element in branches.iter_mut().flatten() {
                    element.for_each_node_mut(f);
                }
            }
            Element::Repeat { body, .. } => {
                for element in body {
                    element.for_each_node_mut(f);
                }
            }
            Element::Anchor => {}
        }
    }

    /// Kinds the first matched node must have, when that is known.
    pub(crate) fn first_kinds(&self) -> Option<Vec<SymbolId>> {
        match self {
            Element::Node(node) => node.test.kinds().map(<[SymbolId]>::to_vec),
            Element::Alt(branches) => {
                let mut kinds = Vec::new();
                for branch in branches {
                    kinds.extend(branch.first()?.first_kinds()?);
                }
                Some(kinds)
            }
            Element::Repeat { body, min, .. } if *min > 0 => body.first()?.first_kinds(),
            Element::Repeat { .. } | Element::Anchor => None,
        }
    }
}

/// One top-level pattern of a query.
#[derive(Debug)]
pub(crate) struct Pattern {
    pub seq: Seq,
    pub start_byte: usize,
    pub text_predicates: Vec<TextPredicate>,
    pub general_predicates: Vec<QueryPredicate>,
    /// When known, a match can only start at a node of one of these kinds.
    pub first_kinds: Option<Vec<SymbolId>>,
}
