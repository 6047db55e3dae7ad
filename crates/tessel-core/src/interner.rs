//! String interning.
//!
//! Names that are compared often (capture names, predicate operators) are
//! stored once and referred to by a [`Name`] handle. Handles compare as
//! integers and are numbered in insertion order.

use indexmap::IndexSet;

/// Handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Name(u32);

impl Name {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Deduplicating string store.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    strings: IndexSet<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `s`, storing it on first use.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(index) = self.strings.get_index_of(s) {
            return Name(index as u32);
        }
        let (index, _) = self.strings.insert_full(s.into());
        Name(index as u32)
    }

    /// The handle of an already interned string.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.strings.get_index_of(s).map(|i| Name(i as u32))
    }

    /// The string behind `name`, or `None` for a handle from another
    /// interner.
    #[inline]
    pub fn resolve(&self, name: Name) -> Option<&str> {
        self.strings.get_index(name.index()).map(|s| &**s)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Every string with its handle, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Name, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (Name(i as u32), &**s))
    }
}
