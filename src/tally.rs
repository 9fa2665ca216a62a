use std::collections::HashMap;

use crate::symbol::Symbol;

/// Occurrence counts per referenced symbol.
///
/// Each worker owns its tally exclusively while scanning; `merge` is
/// associative and commutative, so per-artifact tallies can be combined in
/// any order or grouping with an identical result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTally {
    counts: HashMap<Symbol, u64>,
}

impl ReferenceTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, symbol: Symbol) {
        *self.counts.entry(symbol).or_insert(0) += 1;
    }

    pub fn merge(mut self, other: ReferenceTally) -> ReferenceTally {
        for (symbol, count) in other.counts {
            *self.counts.entry(symbol).or_insert(0) += count;
        }
        self
    }

    pub fn count(&self, symbol: &Symbol) -> u64 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, u64)> {
        self.counts.iter().map(|(symbol, count)| (symbol, *count))
    }
}
