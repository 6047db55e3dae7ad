//! Persistent parse stacks.
//!
//! A stack is a linked list of `Arc` nodes that grows at the top. Forking
//! a version clones one `Arc`; versions share everything below the fork.

use std::sync::Arc;

use tessel_core::Length;
use tessel_table::StateId;

use crate::scanner::ScannerState;
use crate::subtree::Subtree;

#[derive(Debug)]
pub(crate) struct StackNode {
    pub state: StateId,
    /// `None` only for the bottom entry.
    pub subtree: Option<Arc<Subtree>>,
    pub prev: Option<Arc<StackNode>>,
    /// End of this entry in the input.
    pub position: Length,
    /// Totals over the whole stack.
    pub error_cost: u32,
    pub dynamic_precedence: i32,
    pub depth: usize,
}

impl StackNode {
    pub fn bottom(state: StateId) -> Arc<Self> {
        Arc::new(Self {
            state,
            subtree: None,
            prev: None,
            position: Length::ZERO,
            error_cost: 0,
            dynamic_precedence: 0,
            depth: 0,
        })
    }

    pub fn push(self: &Arc<Self>, state: StateId, subtree: Arc<Subtree>) -> Arc<Self> {
        Arc::new(Self {
            state,
            position: self.position + subtree.size,
            error_cost: self.error_cost + subtree.error_cost,
            dynamic_precedence: self.dynamic_precedence + subtree.dynamic_precedence,
            depth: self.depth + 1,
            subtree: Some(subtree),
            prev: Some(Arc::clone(self)),
        })
    }

    pub fn is_extra(&self) -> bool {
        self.subtree.as_ref().is_some_and(|s| s.extra)
    }

    pub fn is_bottom(&self) -> bool {
        self.prev.is_none()
    }
}

impl Drop for StackNode {
    fn drop(&mut self) {
        let mut prev = self.prev.take();
        while let Some(node) = prev {
            match Arc::try_unwrap(node) {
                Ok(mut inner) => prev = inner.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// Splits off the extras on top of `stack`, returned in source order.
pub(crate) fn split_extras(stack: &Arc<StackNode>) -> (Arc<StackNode>, Vec<Arc<Subtree>>) {
    let mut node = Arc::clone(stack);
    let mut extras = Vec::new();
    while node.is_extra() {
        let (Some(subtree), Some(prev)) = (node.subtree.clone(), node.prev.clone()) else {
            break;
        };
        extras.push(subtree);
        node = prev;
    }
    extras.reverse();
    (node, extras)
}

/// Pops `count` non-extra entries along with the extras between them.
/// Returns the remaining stack and the popped subtrees in source order, or
/// `None` when the stack is too shallow.
pub(crate) fn pop_entries(
    stack: &Arc<StackNode>,
    count: usize,
) -> Option<(Arc<StackNode>, Vec<Arc<Subtree>>)> {
    let mut node = Arc::clone(stack);
    let mut popped = Vec::new();
    let mut remaining = count;
    while remaining > 0 {
        let subtree = node.subtree.clone()?;
        if !subtree.extra {
            remaining -= 1;
        }
        popped.push(subtree);
        node = node.prev.clone()?;
    }
    popped.reverse();
    Some((node, popped))
}

/// Every subtree on the stack, bottom first.
pub(crate) fn entries(stack: &Arc<StackNode>) -> Vec<Arc<Subtree>> {
    let mut out = Vec::with_capacity(stack.depth);
    let mut node = Some(stack);
    while let Some(current) = node {
        if let Some(subtree) = &current.subtree {
            out.push(Arc::clone(subtree));
        }
        node = current.prev.as_ref();
    }
    out.reverse();
    out
}

/// Whether two stacks pass through the same states at the same positions.
pub(crate) fn same_shape(a: &Arc<StackNode>, b: &Arc<StackNode>) -> bool {
    if a.depth != b.depth {
        return false;
    }
    let (mut x, mut y) = (Some(a), Some(b));
    while let (Some(p), Some(q)) = (x, y) {
        if Arc::ptr_eq(p, q) {
            return true;
        }
        if p.state != q.state || p.position != q.position || p.is_extra() != q.is_extra() {
            return false;
        }
        x = p.prev.as_ref();
        y = q.prev.as_ref();
    }
    x.is_none() && y.is_none()
}

/// One GLR version: a stack plus the lexing context at its top.
#[derive(Clone, Debug)]
pub(crate) struct Version {
    pub stack: Arc<StackNode>,
    /// The next token, lexed but not yet shifted.
    pub lookahead: Option<Arc<Subtree>>,
    pub scanner: ScannerState,
    /// State to lex the next token in, when it differs from the top state.
    /// Set after pushing a reused node.
    pub lex_state: Option<StateId>,
}

impl Version {
    pub fn new(start_state: StateId) -> Self {
        Self {
            stack: StackNode::bottom(start_state),
            lookahead: None,
            scanner: ScannerState::default(),
            lex_state: None,
        }
    }

    pub fn position(&self) -> Length {
        self.stack.position
    }

    pub fn lex_state(&self) -> StateId {
        self.lex_state.unwrap_or(self.stack.state)
    }

    /// Whether `other` will behave identically from here on.
    pub fn can_merge(&self, other: &Version) -> bool {
        self.lookahead.is_none()
            && other.lookahead.is_none()
            && self.lex_state == other.lex_state
            && self.scanner == other.scanner
            && same_shape(&self.stack, &other.stack)
    }

    /// Whether `self` is preferred over `other`, which comes later in the
    /// version list.
    pub fn beats(&self, other: &Version) -> bool {
        (self.stack.error_cost, -self.stack.dynamic_precedence)
            <= (other.stack.error_cost, -other.stack.dynamic_precedence)
    }
}
