//! LR(1) item sets, merged by core (LALR(1)).
//!
//! States are discovered with a worklist. When a transition leads to a
//! kernel whose core already exists, the lookaheads are merged into that
//! state and it is queued again until nothing changes.

use std::collections::{BTreeMap, HashMap, VecDeque};

use indexmap::IndexMap;
use tessel_table::{SymbolId, TerminalSet};

use crate::flatten::FlatGrammar;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Item {
    pub production: u32,
    pub dot: u16,
}

impl Item {
    fn advance(self) -> Item {
        Item {
            production: self.production,
            dot: self.dot + 1,
        }
    }
}

/// FIRST sets and nullability of every symbol.
pub(crate) struct FirstSets {
    first: Vec<TerminalSet>,
    nullable: Vec<bool>,
    by_lhs: Vec<Vec<u32>>,
}

impl FirstSets {
    pub fn new(grammar: &FlatGrammar) -> Self {
        let count = grammar.symbols.len();
        let mut first = vec![TerminalSet::new(); count];
        let mut nullable = vec![false; count];
        let mut by_lhs = vec![Vec::new(); count];
        for (i, production) in grammar.productions.iter().enumerate() {
            by_lhs[production.lhs as usize].push(i as u32);
        }
        for id in 0..count {
            if grammar.is_terminal(id as SymbolId) {
                first[id].insert(id as SymbolId);
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for production in &grammar.productions {
                let lhs = production.lhs as usize;
                let mut all_nullable = true;
                for step in &production.steps {
                    let symbol = step.symbol as usize;
                    if symbol != lhs {
                        let addition = first[symbol].clone();
                        changed |= first[lhs].union_with(&addition);
                    }
                    if !nullable[symbol] {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable && !nullable[lhs] {
                    nullable[lhs] = true;
                    changed = true;
                }
            }
        }
        Self {
            first,
            nullable,
            by_lhs,
        }
    }

    pub fn productions_of(&self, symbol: SymbolId) -> &[u32] {
        &self.by_lhs[symbol as usize]
    }

    /// FIRST of `symbols`, plus `follow` when all of them are nullable.
    pub fn of_sequence(&self, symbols: &[SymbolId], follow: &TerminalSet) -> TerminalSet {
        let mut out = TerminalSet::new();
        for &symbol in symbols {
            out.union_with(&self.first[symbol as usize]);
            if !self.nullable[symbol as usize] {
                return out;
            }
        }
        out.union_with(follow);
        out
    }
}

pub(crate) struct ItemSet {
    /// Kernel items with their lookaheads, sorted by item.
    pub kernel: Vec<(Item, TerminalSet)>,
    /// Successor state per symbol.
    pub transitions: BTreeMap<SymbolId, usize>,
}

pub(crate) struct Automaton {
    pub states: Vec<ItemSet>,
}

impl Automaton {
    pub fn build(grammar: &FlatGrammar, firsts: &FirstSets) -> Automaton {
        let start = Item {
            production: 0,
            dot: 0,
        };
        let mut states = vec![ItemSet {
            kernel: vec![(start, [0].into_iter().collect())],
            transitions: BTreeMap::new(),
        }];
        let mut by_core: HashMap<Vec<Item>, usize> = HashMap::new();
        by_core.insert(vec![start], 0);

        let mut queue = VecDeque::from([0usize]);
        let mut queued = vec![true];

        while let Some(index) = queue.pop_front() {
            queued[index] = false;
            let items = closure(grammar, firsts, &states[index].kernel);

            let mut successors: BTreeMap<SymbolId, Vec<(Item, TerminalSet)>> = BTreeMap::new();
            for (item, lookahead) in &items {
                let Some(symbol) = next_symbol(grammar, *item) else {
                    continue;
                };
                successors
                    .entry(symbol)
                    .or_default()
                    .push((item.advance(), lookahead.clone()));
            }

            for (symbol, mut kernel) in successors {
                kernel.sort_by_key(|(item, _)| *item);
                let core: Vec<Item> = kernel.iter().map(|(item, _)| *item).collect();
                let target = match by_core.get(&core) {
                    Some(&existing) => {
                        let mut grew = false;
                        for ((_, into), (_, from)) in
                            states[existing].kernel.iter_mut().zip(&kernel)
                        {
                            grew |= into.union_with(from);
                        }
                        if grew && !queued[existing] {
                            queued[existing] = true;
                            queue.push_back(existing);
                        }
                        existing
                    }
                    None => {
                        let id = states.len();
                        states.push(ItemSet {
                            kernel,
                            transitions: BTreeMap::new(),
                        });
                        by_core.insert(core, id);
                        queued.push(true);
                        queue.push_back(id);
                        id
                    }
                };
                states[index].transitions.insert(symbol, target);
            }
        }

        Automaton { states }
    }
}

pub(crate) fn next_symbol(grammar: &FlatGrammar, item: Item) -> Option<SymbolId> {
    grammar.productions[item.production as usize]
        .steps
        .get(item.dot as usize)
        .map(|step| step.symbol)
}

/// Closure of a kernel: every item reachable through non-terminals at the dot.
pub(crate) fn closure(
    grammar: &FlatGrammar,
    firsts: &FirstSets,
    kernel: &[(Item, TerminalSet)],
) -> IndexMap<Item, TerminalSet> {
    let mut items: IndexMap<Item, TerminalSet> = kernel.iter().cloned().collect();
    let mut changed = true;
    while changed {
        changed = false;
        let mut i = 0;
        while i < items.len() {
            let Some((item, lookahead)) = items.get_index(i).map(|(it, la)| (*it, la.clone()))
            else {
                break;
            };
            i += 1;

            let steps = &grammar.productions[item.production as usize].steps;
            let Some(step) = steps.get(item.dot as usize) else {
                continue;
            };
            if grammar.is_terminal(step.symbol) {
                continue;
            }
            let rest: Vec<SymbolId> = steps[item.dot as usize + 1..]
                .iter()
                .map(|s| s.symbol)
                .collect();
            let follow = firsts.of_sequence(&rest, &lookahead);
            for &production in firsts.productions_of(step.symbol) {
                let entry = Item { production, dot: 0 };
                match items.get_mut(&entry) {
                    Some(existing) => changed |= existing.union_with(&follow),
                    None => {
                        items.insert(entry, follow.clone());
                        changed = true;
                    }
                }
            }
        }
    }
    items
}
