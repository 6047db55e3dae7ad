//! Rebalancing of repetition chains.
//!
//! A repetition `R -> R R | item` parses into a left-leaning chain whose
//! depth grows with the number of items. After the parse each chain is
//! rebuilt as a balanced binary tree over the same items, keeping extras
//! between the items they separated. Untouched subtrees keep their
//! identity.

use std::sync::Arc;

use tessel_table::{GrammarTable, SymbolKind};

use crate::subtree::{NodeSpec, Subtree};

/// Rebuilds `root` bottom-up on an explicit work stack; the tree may be
/// arbitrarily deep.
pub(crate) fn balance(table: &GrammarTable, root: &Arc<Subtree>) -> Arc<Subtree> {
    let balancer = Balancer { table };
    let mut tasks = vec![Task::Visit(Arc::clone(root))];
    let mut done: Vec<Arc<Subtree>> = Vec::new();

    while let Some(task) = tasks.pop() {
        match task {
            Task::Visit(node) if node.leaf => done.push(node),
            Task::Visit(node) => {
                if balancer.is_chain(&node)
                    && let Some(units) = balancer.flatten(&node)
                    && units.len() > 2
                {
                    let items: Vec<Task> = units
                        .iter()
                        .rev()
                        .map(|u| Task::Visit(Arc::clone(&u.item)))
                        .collect();
                    tasks.push(Task::Chain(node, units));
                    tasks.extend(items);
                    continue;
                }
                let children: Vec<Task> = node
                    .children
                    .iter()
                    .rev()
                    .map(|c| Task::Visit(Arc::clone(&c.node)))
                    .collect();
                tasks.push(Task::Rebuild(node));
                tasks.extend(children);
            }
            Task::Rebuild(node) => {
                let children = done.split_off(done.len() - node.children.len());
                done.push(rebuild(node, children));
            }
            Task::Chain(node, mut units) => {
                let items = done.split_off(done.len() - units.len());
                for (unit, item) in units.iter_mut().zip(items) {
                    unit.item = item;
                }
                done.push(balancer.build(&node, &units));
            }
        }
    }
    done.pop().unwrap_or_else(|| Arc::clone(root))
}

enum Task {
    Visit(Arc<Subtree>),
    /// Children are on the done stack; swap them in.
    Rebuild(Arc<Subtree>),
    /// Balanced items are on the done stack.
    Chain(Arc<Subtree>, Vec<Unit>),
}

/// `node` with `children` in place of its own, or `node` itself when
/// nothing changed.
fn rebuild(node: Arc<Subtree>, children: Vec<Arc<Subtree>>) -> Arc<Subtree> {
    if children
        .iter()
        .zip(&node.children)
        .all(|(new, old)| Arc::ptr_eq(new, &old.node))
    {
        return node;
    }
    let mut copy = node.shallow_clone();
    for (link, child) in copy.children.iter_mut().zip(children) {
        link.node = child;
    }
    Arc::new(copy)
}

/// One element of a flattened chain: an item and the extras before it.
struct Unit {
    extras: Vec<Arc<Subtree>>,
    item: Arc<Subtree>,
}

struct Balancer<'a> {
    table: &'a GrammarTable,
}

impl Balancer<'_> {
    /// A binary repetition node: both structural children have its symbol.
    fn is_chain(&self, node: &Subtree) -> bool {
        if node.leaf || self.table.symbol(node.symbol).kind != SymbolKind::Auxiliary {
            return false;
        }
        let mut structural = node.structural_children();
        matches!(
            (structural.next(), structural.next(), structural.next()),
            (Some(a), Some(b), None) if a.node.symbol == node.symbol && b.node.symbol == node.symbol
        )
    }

    /// The items of a chain in order, each with the extras before it.
    /// `None` when extras come before the first item or after the last.
    fn flatten(&self, node: &Arc<Subtree>) -> Option<Vec<Unit>> {
        let mut units = Vec::new();
        let mut extras = Vec::new();
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if current.extra {
                extras.push(Arc::clone(current));
            } else if self.is_chain(current) {
                pending.extend(current.children.iter().rev().map(|c| &c.node));
            } else {
                units.push(Unit {
                    extras: std::mem::take(&mut extras),
                    item: Arc::clone(current),
                });
            }
        }
        let leading = units.first().is_some_and(|u| !u.extras.is_empty());
        (extras.is_empty() && !leading).then_some(units)
    }

    fn build(&self, template: &Subtree, units: &[Unit]) -> Arc<Subtree> {
        if let [unit] = units {
            return Arc::clone(&unit.item);
        }
        let mid = units.len() / 2;
        let left = self.build(template, &units[..mid]);
        let right = self.build(template, &units[mid..]);
        let spec = NodeSpec {
            symbol: template.symbol,
            dynamic_precedence: 0,
            parse_state: left.parse_state,
            extra: false,
            fragile: true,
            next_state: None,
            lookahead: 0,
            scanner: left.scanner_after.clone(),
        };
        let children = std::iter::once(left)
            .chain(units[mid].extras.iter().cloned())
            .chain(std::iter::once(right))
            .map(|node| (node, None, None));
        Arc::new(Subtree::node(spec, children))
    }
}
