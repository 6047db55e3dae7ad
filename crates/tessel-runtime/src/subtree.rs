//! Raw syntax nodes.
//!
//! A [`Subtree`] is immutable once built and shared through `Arc` between
//! the parse stack, the finished tree and later trees that reuse it. Sizes
//! are relative: a child only knows its offset inside the parent, so an
//! edit only rebuilds the nodes on the path to the change.

use std::sync::Arc;

use tessel_core::Length;
use tessel_table::{FieldId, GrammarTable, StateId, SymbolId};

use crate::scanner::ScannerState;

#[derive(Clone, Debug)]
pub(crate) struct Child {
    /// Start of the child relative to the start of the parent.
    pub offset: Length,
    pub field: Option<FieldId>,
    pub alias: Option<SymbolId>,
    pub node: Arc<Subtree>,
}

#[derive(Debug)]
pub(crate) struct Subtree {
    pub symbol: SymbolId,
    pub size: Length,
    pub children: Vec<Child>,
    pub leaf: bool,
    pub extra: bool,
    pub has_changes: bool,
    /// Never reused: built while several parse versions were alive, or
    /// synthesized after the parse.
    pub fragile: bool,
    /// Number of `ERROR` nodes in the subtree.
    pub error_cost: u32,
    pub dynamic_precedence: i32,
    /// For leaves, the state the token was lexed in; for inner nodes, the
    /// state below the node on the parse stack.
    pub parse_state: StateId,
    /// Lex mode of the first token; `None` when it was lexed in error mode.
    pub first_lex_mode: Option<u16>,
    /// State the token after this node was lexed in.
    pub next_state: Option<StateId>,
    /// Bytes past the end that influenced this node.
    pub lookahead: usize,
    pub scanner_before: ScannerState,
    pub scanner_after: ScannerState,
}

/// Inputs for a new inner node.
pub(crate) struct NodeSpec {
    pub symbol: SymbolId,
    pub dynamic_precedence: i32,
    pub parse_state: StateId,
    pub extra: bool,
    pub fragile: bool,
    pub next_state: Option<StateId>,
    /// Extra bytes influencing the node beyond those its children examined,
    /// measured from the node's end.
    pub lookahead: usize,
    /// Scanner state for a node without children.
    pub scanner: ScannerState,
}

impl Subtree {
    pub fn leaf(
        symbol: SymbolId,
        size: Length,
        lookahead: usize,
        parse_state: StateId,
        first_lex_mode: Option<u16>,
        scanner_before: ScannerState,
        scanner_after: ScannerState,
    ) -> Self {
        Self {
            symbol,
            size,
            children: Vec::new(),
            leaf: true,
            extra: false,
            has_changes: false,
            fragile: false,
            error_cost: u32::from(symbol == GrammarTable::ERROR),
            dynamic_precedence: 0,
            parse_state,
            first_lex_mode,
            next_state: None,
            lookahead,
            scanner_before,
            scanner_after,
        }
    }

    /// Builds an inner node over `children`, given as subtrees with their
    /// field and alias, in source order.
    pub fn node(
        spec: NodeSpec,
        children: impl IntoIterator<Item = (Arc<Subtree>, Option<FieldId>, Option<SymbolId>)>,
    ) -> Self {
        let mut size = Length::ZERO;
        let mut links = Vec::new();
        let mut error_cost = u32::from(spec.symbol == GrammarTable::ERROR);
        let mut dynamic_precedence = spec.dynamic_precedence;
        let mut fragile = spec.fragile;
        let mut reach = 0usize;
        for (node, field, alias) in children {
            error_cost += node.error_cost;
            dynamic_precedence += node.dynamic_precedence;
            fragile |= node.fragile;
            reach = reach.max(size.bytes + node.size.bytes + node.lookahead);
            let offset = size;
            size = size + node.size;
            links.push(Child {
                offset,
                field,
                alias,
                node,
            });
        }
        let lookahead = reach.saturating_sub(size.bytes).max(spec.lookahead);
        let (first_lex_mode, scanner_before, scanner_after) = match (links.first(), links.last()) {
            (Some(first), Some(last)) => (
                first.node.first_lex_mode,
                first.node.scanner_before.clone(),
                last.node.scanner_after.clone(),
            ),
            _ => (None, spec.scanner.clone(), spec.scanner),
        };
        Self {
            symbol: spec.symbol,
            size,
            children: links,
            leaf: false,
            extra: spec.extra,
            has_changes: false,
            fragile,
            error_cost,
            dynamic_precedence,
            parse_state: spec.parse_state,
            first_lex_mode,
            next_state: spec.next_state,
            lookahead,
            scanner_before,
            scanner_after,
        }
    }

    /// A shallow copy sharing the children.
    pub fn shallow_clone(&self) -> Self {
        Self {
            symbol: self.symbol,
            size: self.size,
            children: self.children.clone(),
            leaf: self.leaf,
            extra: self.extra,
            has_changes: self.has_changes,
            fragile: self.fragile,
            error_cost: self.error_cost,
            dynamic_precedence: self.dynamic_precedence,
            parse_state: self.parse_state,
            first_lex_mode: self.first_lex_mode,
            next_state: self.next_state,
            lookahead: self.lookahead,
            scanner_before: self.scanner_before.clone(),
            scanner_after: self.scanner_after.clone(),
        }
    }

    pub fn with_extra(&self, extra: bool) -> Self {
        let mut copy = self.shallow_clone();
        copy.extra = extra;
        copy
    }

    /// First leaf in the subtree, if any.
    pub fn first_leaf(&self) -> Option<&Subtree> {
        let mut node = self;
        while !node.leaf {
            node = &node.children.first()?.node;
        }
        Some(node)
    }

    /// Non-extra children.
    pub fn structural_children(&self) -> impl Iterator<Item = &Child> {
        self.children.iter().filter(|c| !c.node.extra)
    }
}

impl Drop for Subtree {
    // Deep trees would overflow the stack with recursive drops.
    fn drop(&mut self) {
        let mut pending: Vec<Arc<Subtree>> = self.children.drain(..).map(|c| c.node).collect();
        while let Some(node) = pending.pop() {
            if let Ok(mut inner) = Arc::try_unwrap(node) {
                pending.extend(inner.children.drain(..).map(|c| c.node));
            }
        }
    }
}
