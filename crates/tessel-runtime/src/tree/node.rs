//! The visible-node view of a tree.

use std::fmt;
use std::str::Utf8Error;

use tessel_core::{Length, Point};
use tessel_table::{FieldId, GrammarTable, SymbolId};

use super::cursor::is_visible;
use super::{Range, Tree, TreeCursor};
use crate::Language;
use crate::subtree::Subtree;

/// A visible node of a [`Tree`]: a raw node plus its absolute position.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    pub(crate) tree: &'tree Tree,
    pub(crate) subtree: &'tree Subtree,
    pub(crate) position: Length,
    pub(crate) alias: Option<SymbolId>,
}

impl<'tree> Node<'tree> {
    pub(crate) fn new(
        tree: &'tree Tree,
        subtree: &'tree Subtree,
        position: Length,
        alias: Option<SymbolId>,
    ) -> Self {
        Self {
            tree,
            subtree,
            position,
            alias,
        }
    }

    fn table(&self) -> &'tree GrammarTable {
        self.tree.language().table()
    }

    /// Identifies the node within its tree. Shared subtrees keep their id
    /// across trees.
    pub fn id(&self) -> usize {
        std::ptr::from_ref(self.subtree) as usize
    }

    pub fn language(&self) -> &'tree Language {
        self.tree.language()
    }

    pub fn kind_id(&self) -> SymbolId {
        self.alias.unwrap_or(self.subtree.symbol)
    }

    pub fn kind(&self) -> &'tree str {
        self.table().symbol_name(self.kind_id())
    }

    /// The symbol the grammar produced, ignoring aliases.
    pub fn grammar_id(&self) -> SymbolId {
        self.subtree.symbol
    }

    pub fn is_named(&self) -> bool {
        self.table().symbol(self.kind_id()).named
    }

    pub fn is_visible(&self) -> bool {
        is_visible(self.tree, self.subtree, self.alias)
    }

    pub fn is_extra(&self) -> bool {
        self.subtree.extra
    }

    pub fn is_error(&self) -> bool {
        self.subtree.symbol == GrammarTable::ERROR
    }

    pub fn has_error(&self) -> bool {
        self.subtree.error_cost > 0
    }

    pub fn has_changes(&self) -> bool {
        self.subtree.has_changes
    }

    /// Always `false`: recovery skips input instead of inventing tokens.
    pub fn is_missing(&self) -> bool {
        false
    }

    pub fn start_byte(&self) -> usize {
        self.position.bytes
    }

    pub fn end_byte(&self) -> usize {
        self.position.bytes + self.subtree.size.bytes
    }

    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.start_byte()..self.end_byte()
    }

    pub fn start_position(&self) -> Point {
        self.position.extent
    }

    pub fn end_position(&self) -> Point {
        (self.position + self.subtree.size).extent
    }

    pub fn range(&self) -> Range {
        Range {
            start_byte: self.start_byte(),
            end_byte: self.end_byte(),
            start_point: self.start_position(),
            end_point: self.end_position(),
        }
    }

    pub fn utf8_text<'a>(&self, source: &'a [u8]) -> Result<&'a str, Utf8Error> {
        std::str::from_utf8(&source[self.start_byte()..self.end_byte()])
    }

    pub fn walk(&self) -> TreeCursor<'tree> {
        TreeCursor::new(*self)
    }

    pub fn children(&self) -> Children<'tree> {
        let mut cursor = self.walk();
        let done = !cursor.goto_first_child();
        Children { cursor, done }
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        self.children().filter(Node::is_named)
    }

    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    pub fn child(&self, index: usize) -> Option<Node<'tree>> {
        self.children().nth(index)
    }

    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    pub fn named_child(&self, index: usize) -> Option<Node<'tree>> {
        self.named_children().nth(index)
    }

    /// Children paired with their (possibly inherited) field.
    fn children_with_fields(&self) -> impl Iterator<Item = (Option<FieldId>, Node<'tree>)> + use<'tree> {
        self.children().with_fields()
    }

    pub fn child_by_field_id(&self, field: FieldId) -> Option<Node<'tree>> {
        self.children_with_fields()
            .find(|(f, _)| *f == Some(field))
            .map(|(_, node)| node)
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'tree>> {
        self.child_by_field_id(self.table().field_id(name)?)
    }

    pub fn children_by_field_id(&self, field: FieldId) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        self.children_with_fields()
            .filter(move |(f, _)| *f == Some(field))
            .map(|(_, node)| node)
    }

    /// Children under field `name`; empty when the language has no such
    /// field.
    pub fn children_by_field_name(&self, name: &str) -> Vec<Node<'tree>> {
        match self.table().field_id(name) {
            Some(field) => self.children_by_field_id(field).collect(),
            None => Vec::new(),
        }
    }

    pub fn field_name_for_child(&self, index: usize) -> Option<&'tree str> {
        let (field, _) = self.children_with_fields().nth(index)?;
        self.table().field_name(field?)
    }

    /// The nearest visible ancestor, found by searching down from the root.
    pub fn parent(&self) -> Option<Node<'tree>> {
        let root = self.tree.root_node();
        if *self == root {
            return None;
        }
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            let mut candidates = Vec::new();
            for child in node.children() {
                if child == *self {
                    return Some(node);
                }
                if child.start_byte() <= self.start_byte() && self.end_byte() <= child.end_byte() {
                    candidates.push(child);
                }
            }
            pending.extend(candidates.into_iter().rev());
        }
        None
    }

    fn siblings(&self) -> Option<(Vec<Node<'tree>>, usize)> {
        let siblings: Vec<Node<'tree>> = self.parent()?.children().collect();
        let index = siblings.iter().position(|s| s == self)?;
        Some((siblings, index))
    }

    pub fn next_sibling(&self) -> Option<Node<'tree>> {
        let (siblings, index) = self.siblings()?;
        siblings.get(index + 1).copied()
    }

    pub fn prev_sibling(&self) -> Option<Node<'tree>> {
        let (siblings, index) = self.siblings()?;
        siblings.get(index.checked_sub(1)?).copied()
    }

    pub fn next_named_sibling(&self) -> Option<Node<'tree>> {
        let (siblings, index) = self.siblings()?;
        siblings[index + 1..].iter().find(|s| s.is_named()).copied()
    }

    pub fn prev_named_sibling(&self) -> Option<Node<'tree>> {
        let (siblings, index) = self.siblings()?;
        siblings[..index].iter().rev().find(|s| s.is_named()).copied()
    }

    /// The first child that ends after `byte`.
    pub fn first_child_for_byte(&self, byte: usize) -> Option<Node<'tree>> {
        self.first_for_byte(self.subtree, self.position, byte, false)
    }

    pub fn first_named_child_for_byte(&self, byte: usize) -> Option<Node<'tree>> {
        self.first_for_byte(self.subtree, self.position, byte, true)
    }

    fn first_for_byte(
        &self,
        subtree: &'tree Subtree,
        position: Length,
        byte: usize,
        named: bool,
    ) -> Option<Node<'tree>> {
        let children = &subtree.children;
        let first = children.partition_point(|c| position.bytes + c.offset.bytes + c.node.size.bytes <= byte);
        for child in &children[first..] {
            let start = position + child.offset;
            let node = Node::new(self.tree, &child.node, start, child.alias);
            if node.is_visible() {
                if !named || node.is_named() {
                    return Some(node);
                }
            } else if let Some(found) = self.first_for_byte(&child.node, start, byte, named) {
                return Some(found);
            }
        }
        None
    }

    /// The smallest node below this one spanning `start..end`.
    pub fn descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'tree>> {
        self.descendant_in(start, end, false)
    }

    pub fn named_descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'tree>> {
        self.descendant_in(start, end, true)
    }

    fn descendant_in(&self, start: usize, end: usize, named: bool) -> Option<Node<'tree>> {
        if start > end || start < self.start_byte() || end > self.end_byte() {
            return None;
        }
        let mut node = *self;
        let mut best = *self;
        'descend: loop {
            for child in node.children() {
                let spans = child.start_byte() <= start
                    && end <= child.end_byte()
                    && (start < child.end_byte() || child.start_byte() == child.end_byte());
                if spans {
                    if !named || child.is_named() {
                        best = child;
                    }
                    node = child;
                    continue 'descend;
                }
            }
            return Some(best);
        }
    }

    /// Visible descendants in pre-order, starting with this node.
    pub fn descendants(&self) -> Descendants<'tree> {
        Descendants {
            cursor: self.walk(),
            started: false,
            done: false,
        }
    }

    /// S-expression of the named nodes, with field labels.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        let mut cursor = self.walk();
        let mut descending = true;
        loop {
            if descending {
                let node = cursor.node();
                let printed = cursor.depth() == 0 || node.is_named();
                if printed {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    if cursor.depth() > 0
                        && let Some(field) = cursor.field_name()
                    {
                        out.push_str(field);
                        out.push_str(": ");
                    }
                    out.push('(');
                    out.push_str(node.kind());
                }
                if cursor.goto_first_child() {
                    continue;
                }
                if printed {
                    out.push(')');
                }
            }
            if cursor.depth() == 0 {
                break;
            }
            if cursor.goto_next_sibling() {
                descending = true;
                continue;
            }
            cursor.goto_parent();
            if cursor.depth() == 0 || cursor.node().is_named() {
                out.push(')');
            }
            descending = false;
        }
        out
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && std::ptr::eq(self.subtree, other.subtree)
            && self.position == other.position
            && self.alias == other.alias
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Node {} {} - {}}}",
            self.kind(),
            self.start_position(),
            self.end_position()
        )
    }
}

/// Visible children of a node, in order.
pub struct Children<'tree> {
    cursor: TreeCursor<'tree>,
    done: bool,
}

impl<'tree> Children<'tree> {
    /// Pairs each child with its field, inherited through hidden parents.
    pub fn with_fields(self) -> impl Iterator<Item = (Option<FieldId>, Node<'tree>)> {
        let Children { mut cursor, mut done } = self;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let item = (cursor.field_id(), cursor.node());
            done = !cursor.goto_next_sibling();
            Some(item)
        })
    }
}

impl<'tree> Iterator for Children<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Node<'tree>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        self.done = !self.cursor.goto_next_sibling();
        Some(node)
    }
}

/// Lazy pre-order walk over visible nodes.
pub struct Descendants<'tree> {
    cursor: TreeCursor<'tree>,
    started: bool,
    done: bool,
}

impl<'tree> Iterator for Descendants<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Node<'tree>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.cursor.node());
        }
        if self.cursor.goto_first_child() {
            return Some(self.cursor.node());
        }
        loop {
            if self.cursor.depth() == 0 {
                self.done = true;
                return None;
            }
            if self.cursor.goto_next_sibling() {
                return Some(self.cursor.node());
            }
            self.cursor.goto_parent();
        }
    }
}
