//! Bit set over terminal symbol ids.

use serde::{Deserialize, Serialize};

use crate::SymbolId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerminalSet(Vec<u64>);

impl TerminalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, symbol: SymbolId) -> bool {
        let (word, bit) = Self::slot(symbol);
        self.0.get(word).is_some_and(|w| w & bit != 0)
    }

    /// Inserts `symbol`, returning whether it was newly added.
    pub fn insert(&mut self, symbol: SymbolId) -> bool {
        let (word, bit) = Self::slot(symbol);
        if word >= self.0.len() {
            self.0.resize(word + 1, 0);
        }
        let added = self.0[word] & bit == 0;
        self.0[word] |= bit;
        added
    }

    /// Adds every member of `other`, returning whether anything changed.
    pub fn union_with(&mut self, other: &TerminalSet) -> bool {
        if other.0.len() > self.0.len() {
            self.0.resize(other.0.len(), 0);
        }
        let mut changed = false;
        for (mine, theirs) in self.0.iter_mut().zip(&other.0) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.0.iter().enumerate().flat_map(|(i, &word)| {
            (0..64u32)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| (i * 64 + bit as usize) as SymbolId)
        })
    }

    fn slot(symbol: SymbolId) -> (usize, u64) {
        let index = symbol as usize;
        (index / 64, 1u64 << (index % 64))
    }
}

impl FromIterator<SymbolId> for TerminalSet {
    fn from_iter<I: IntoIterator<Item = SymbolId>>(iter: I) -> Self {
        let mut set = TerminalSet::new();
        for symbol in iter {
            set.insert(symbol);
        }
        set
    }
}
