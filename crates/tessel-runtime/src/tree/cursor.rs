//! Stateful navigation over the visible nodes of a tree.

use tessel_core::Length;
use tessel_table::{FieldId, SymbolId};

use super::{Node, Tree};
use crate::subtree::Subtree;

/// One raw node on the path from the cursor's root to its current node.
#[derive(Clone, Copy)]
struct Frame<'tree> {
    subtree: &'tree Subtree,
    position: Length,
    /// Index among the parent's raw children.
    index: usize,
    field: Option<FieldId>,
    alias: Option<SymbolId>,
    visible: bool,
}

/// A cursor over the visible nodes below the node it was created for.
///
/// Hidden nodes are stepped through: the children of a hidden child appear
/// as children of the nearest visible ancestor.
#[derive(Clone)]
pub struct TreeCursor<'tree> {
    tree: &'tree Tree,
    frames: Vec<Frame<'tree>>,
}

impl<'tree> TreeCursor<'tree> {
    pub(crate) fn new(node: Node<'tree>) -> Self {
        Self {
            tree: node.tree,
            frames: vec![Self::root_frame(node)],
        }
    }

    fn root_frame(node: Node<'tree>) -> Frame<'tree> {
        Frame {
            subtree: node.subtree,
            position: node.position,
            index: 0,
            field: None,
            alias: node.alias,
            visible: true,
        }
    }

    fn top(&self) -> Frame<'tree> {
        self.frames[self.frames.len() - 1]
    }

    pub fn node(&self) -> Node<'tree> {
        let top = self.top();
        Node::new(self.tree, top.subtree, top.position, top.alias)
    }

    /// Field of the current node, inherited through hidden parents.
    pub fn field_id(&self) -> Option<FieldId> {
        let (current, ancestors) = self.frames.split_last()?;
        if current.field.is_some() {
            return current.field;
        }
        for frame in ancestors.iter().rev() {
            if frame.visible {
                break;
            }
            if frame.field.is_some() {
                return frame.field;
            }
        }
        None
    }

    pub fn field_name(&self) -> Option<&'tree str> {
        let id = self.field_id()?;
        self.tree.language().table().field_name(id)
    }

    /// Visible ancestors between the cursor's root and the current node.
    pub fn depth(&self) -> usize {
        self.frames.iter().filter(|f| f.visible).count() - 1
    }

    pub fn reset(&mut self, node: Node<'tree>) {
        self.tree = node.tree;
        self.frames.clear();
        self.frames.push(Self::root_frame(node));
    }

    pub fn goto_first_child(&mut self) -> bool {
        let depth = self.frames.len();
        if self.descend(false) {
            return true;
        }
        self.frames.truncate(depth);
        false
    }

    pub fn goto_last_child(&mut self) -> bool {
        let depth = self.frames.len();
        if self.descend(true) {
            return true;
        }
        self.frames.truncate(depth);
        false
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        self.goto_sibling(false)
    }

    pub fn goto_previous_sibling(&mut self) -> bool {
        self.goto_sibling(true)
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.frames.len() <= 1 {
            return false;
        }
        self.frames.pop();
        while !self.top().visible {
            self.frames.pop();
        }
        true
    }

    /// Moves to the first child that ends after `byte` and returns its
    /// index, or stays put and returns `None`.
    pub fn goto_first_child_for_byte(&mut self, byte: usize) -> Option<usize> {
        if !self.goto_first_child() {
            return None;
        }
        let mut index = 0;
        loop {
            if self.node().end_byte() > byte {
                return Some(index);
            }
            if !self.goto_next_sibling() {
                self.goto_parent();
                return None;
            }
            index += 1;
        }
    }

    fn frame(&self, parent: Frame<'tree>, index: usize) -> Frame<'tree> {
        let child = &parent.subtree.children[index];
        Frame {
            subtree: &child.node,
            position: parent.position + child.offset,
            index,
            field: child.field,
            alias: child.alias,
            visible: is_visible(self.tree, &child.node, child.alias),
        }
    }

    /// Pushes the path to the first (or last) visible node below the top
    /// frame, looking through hidden children.
    fn descend(&mut self, backwards: bool) -> bool {
        let parent = self.top();
        let count = parent.subtree.children.len();
        self.search(parent, ordered(0..count, backwards), backwards)
    }

    fn goto_sibling(&mut self, backwards: bool) -> bool {
        let saved = self.frames.clone();
        while self.frames.len() > 1 {
            let Some(current) = self.frames.pop() else {
                break;
            };
            let parent = self.top();
            let count = parent.subtree.children.len();
            let rest = if backwards {
                ordered(0..current.index, true)
            } else {
                ordered(current.index + 1..count, false)
            };
            if self.search(parent, rest, backwards) {
                return true;
            }
            if parent.visible {
                break;
            }
        }
        self.frames = saved;
        false
    }

    /// Tries `indices` of `parent`'s children in turn, descending into
    /// hidden ones.
    fn search(
        &mut self,
        parent: Frame<'tree>,
        indices: Box<dyn Iterator<Item = usize>>,
        backwards: bool,
    ) -> bool {
        for index in indices {
            let frame = self.frame(parent, index);
            self.frames.push(frame);
            if frame.visible {
                return true;
            }
            let depth = self.frames.len();
            if self.descend(backwards) {
                return true;
            }
            self.frames.truncate(depth);
            self.frames.pop();
        }
        false
    }
}

fn ordered(range: std::ops::Range<usize>, backwards: bool) -> Box<dyn Iterator<Item = usize>> {
    if backwards {
        Box::new(range.rev())
    } else {
        Box::new(range)
    }
}

pub(crate) fn is_visible(tree: &Tree, subtree: &Subtree, alias: Option<SymbolId>) -> bool {
    let table = tree.language().table();
    table.symbol(alias.unwrap_or(subtree.symbol)).visible
}
