//! Syntax trees.
//!
//! A [`Tree`] owns the root of an immutable, `Arc`-shared node structure.
//! [`Node`] and [`TreeCursor`] borrow it and expose only visible nodes:
//! hidden rules, repetition helpers and trivia are stepped through.

mod cursor;
mod node;

#[cfg(test)]
mod edit_tests;
#[cfg(test)]
mod node_tests;

use std::fmt;
use std::sync::Arc;

use tessel_core::{InputEdit, Length, Point};
use tessel_table::{FieldId, SymbolId};

use crate::Language;
use crate::subtree::{Child, Subtree};

pub use cursor::TreeCursor;
pub use node::{Children, Descendants, Node};

/// A span of the source in bytes and points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_point: Point,
    pub end_point: Point,
}

impl Range {
    fn union(self, other: Range) -> Range {
        let (start_byte, start_point) = if other.start_byte < self.start_byte {
            (other.start_byte, other.start_point)
        } else {
            (self.start_byte, self.start_point)
        };
        let (end_byte, end_point) = if other.end_byte > self.end_byte {
            (other.end_byte, other.end_point)
        } else {
            (self.end_byte, self.end_point)
        };
        Range {
            start_byte,
            end_byte,
            start_point,
            end_point,
        }
    }
}

/// The result of a parse. Cheap to clone; clones share every node.
#[derive(Clone)]
pub struct Tree {
    root: Arc<Subtree>,
    language: Language,
}

impl Tree {
    pub(crate) fn new(root: Arc<Subtree>, language: Language) -> Self {
        Self { root, language }
    }

    pub(crate) fn root(&self) -> &Arc<Subtree> {
        &self.root
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, &self.root, Length::ZERO, None)
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        self.root_node().walk()
    }

    pub fn to_sexp(&self) -> String {
        self.root_node().to_sexp()
    }

    /// Every raw leaf in source order, including hidden and trivia leaves.
    /// Their texts concatenate to the parsed input.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            tree: self,
            pending: vec![(&*self.root, Length::ZERO, None)],
        }
    }

    /// Adjusts the tree to an edit of its source.
    ///
    /// Node positions are mapped into the new text, and every node the
    /// edit can have influenced is copied with `has_changes` set: those
    /// overlapping the edit or whose lookahead reaches into it. Everything
    /// else stays shared with the unedited tree.
    pub fn edit(&mut self, edit: &InputEdit) {
        tracing::trace!(
            target: "tessel::tree",
            start = edit.start_byte,
            old_end = edit.old_end_byte,
            new_end = edit.new_end_byte,
            "edit"
        );
        self.root = edit_subtree(&self.root, edit);
    }

    /// Ranges whose syntactic structure differs between `old` (an edited
    /// earlier version of this tree) and `self`, sorted and merged.
    pub fn changed_ranges(&self, old: &Tree) -> Vec<Range> {
        let mut ranges: Vec<Range> = Vec::new();
        let mut pending = vec![(old.root_node(), self.root_node())];
        while let Some((before, after)) = pending.pop() {
            if std::ptr::eq(before.subtree, after.subtree) && before.position == after.position {
                continue;
            }
            let same_node = before.kind_id() == after.kind_id() && before.byte_range() == after.byte_range();
            let before_children: Vec<Node<'_>> = before.children().collect();
            let after_children: Vec<Node<'_>> = after.children().collect();
            if !same_node || before_children.len() != after_children.len() {
                ranges.push(before.range().union(after.range()));
            } else if !before_children.is_empty() {
                pending.extend(before_children.into_iter().zip(after_children));
            } else if before.has_changes() {
                ranges.push(after.range());
            }
        }
        ranges.sort_by_key(|r| (r.start_byte, r.end_byte));
        let mut merged: Vec<Range> = Vec::new();
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start_byte <= last.end_byte => *last = last.union(range),
                _ => merged.push(range),
            }
        }
        merged
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Tree {}}}", self.to_sexp())
    }
}

fn affected(node: &Subtree, start: Length, edit: &InputEdit) -> bool {
    let end = start.bytes + node.size.bytes;
    edit.start_byte < end + node.lookahead && edit.old_end_byte >= start.bytes
}

/// A node of the old tree being rebuilt, with its rebuilt children so far.
struct Rebuild<'a> {
    node: &'a Subtree,
    start: Length,
    link: (Option<FieldId>, Option<SymbolId>),
    next: usize,
    children: Vec<Child>,
}

/// Copies the nodes `edit` affects, post-order and without recursion.
fn edit_subtree(root: &Arc<Subtree>, edit: &InputEdit) -> Arc<Subtree> {
    let mut stack = vec![Rebuild {
        node: root,
        start: Length::ZERO,
        link: (None, None),
        next: 0,
        children: Vec::new(),
    }];
    loop {
        let Some(top) = stack.last_mut() else {
            return Arc::clone(root);
        };
        if let Some(child) = top.node.children.get(top.next) {
            top.next += 1;
            let start = top.start + child.offset;
            if affected(&child.node, start, edit) {
                stack.push(Rebuild {
                    node: &child.node,
                    start,
                    link: (child.field, child.alias),
                    next: 0,
                    children: Vec::new(),
                });
            } else {
                let offset = edit.map(start) - edit.map(top.start);
                top.children.push(Child {
                    offset,
                    ..child.clone()
                });
            }
            continue;
        }

        let Some(done) = stack.pop() else {
            return Arc::clone(root);
        };
        let new_start = edit.map(done.start);
        let new_end = edit.map(done.start + done.node.size);
        let mut copy = done.node.shallow_clone();
        copy.has_changes = true;
        copy.size = new_end - new_start;
        if !copy.leaf {
            copy.children = done.children;
        }
        let copy = Arc::new(copy);
        match stack.last_mut() {
            Some(parent) => {
                let offset = new_start - edit.map(parent.start);
                parent.children.push(Child {
                    offset,
                    field: done.link.0,
                    alias: done.link.1,
                    node: copy,
                });
            }
            None => return copy,
        }
    }
}

/// Iterator over raw leaves.
pub struct Leaves<'tree> {
    tree: &'tree Tree,
    pending: Vec<(&'tree Subtree, Length, Option<SymbolId>)>,
}

impl<'tree> Iterator for Leaves<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Node<'tree>> {
        while let Some((subtree, position, alias)) = self.pending.pop() {
            if subtree.leaf {
                return Some(Node::new(self.tree, subtree, position, alias));
            }
            for child in subtree.children.iter().rev() {
                self.pending.push((&child.node, position + child.offset, child.alias));
            }
        }
        None
    }
}
