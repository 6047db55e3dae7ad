//! Walks the previous tree in document order, offering subtrees for reuse.

use std::sync::Arc;

use tessel_core::Length;

use crate::subtree::Subtree;

pub(crate) struct ReusableNodes<'a> {
    /// Nodes still to visit with their absolute start; the next one last.
    pending: Vec<(&'a Arc<Subtree>, Length)>,
}

impl<'a> ReusableNodes<'a> {
    pub fn new(root: &'a Arc<Subtree>) -> Self {
        Self {
            pending: vec![(root, Length::ZERO)],
        }
    }

    pub fn peek(&self) -> Option<(&'a Arc<Subtree>, Length)> {
        self.pending.last().copied()
    }

    /// Skips the current node and everything inside it.
    pub fn advance(&mut self) {
        self.pending.pop();
    }

    /// Replaces the current node by its children.
    pub fn descend(&mut self) {
        let Some((node, start)) = self.pending.pop() else {
            return;
        };
        for child in node.children.iter().rev() {
            self.pending.push((&child.node, start + child.offset));
        }
    }

    /// Moves to the first node that starts at `position`, skipping
    /// everything that ends before it. Returns `None` when the next node
    /// starts later.
    pub fn seek(&mut self, position: usize) -> Option<(&'a Arc<Subtree>, Length)> {
        loop {
            let (node, start) = self.peek()?;
            let end = start.bytes + node.size.bytes;
            if start.bytes > position {
                return None;
            }
            if end <= position || (start.bytes == position && node.size.is_zero()) {
                self.advance();
            } else if start.bytes < position {
                self.descend();
            } else {
                return Some((node, start));
            }
        }
    }
}
