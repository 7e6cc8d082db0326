//! Arrow index: a globally sorted arrow set plus an `(x, y)` lookup table.
//!
//! Search order comes from the sorted set only. The lookup table exists so
//! that all arrows for one ordered pair can be removed without scanning the
//! set. A cell is `None` until the pair has been evaluated; a computed cell
//! with no positive-bump arrow is `Some(vec![])`.

use std::collections::BTreeSet;

use ges_kernel::graph::VarId;

use crate::arrow::Arrow;

pub struct ArrowIndex {
    n: usize,
    sorted: BTreeSet<Arrow>,
    lookup: Vec<Option<Vec<Arrow>>>,
    high_water: u64,
    pushed: u64,
}

impl ArrowIndex {
    /// Empty index over `n` variables; every cell uncomputed.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            n,
            sorted: BTreeSet::new(),
            lookup: vec![None; n * n],
            high_water: 0,
            pushed: 0,
        }
    }

    fn cell(&self, x: VarId, y: VarId) -> usize {
        x.index() * self.n + y.index()
    }

    /// Mark the `(x, y)` cell computed, keeping any arrows already in it.
    pub fn mark_computed(&mut self, x: VarId, y: VarId) {
        let c = self.cell(x, y);
        self.lookup[c].get_or_insert_with(Vec::new);
    }

    #[must_use]
    pub fn is_computed(&self, x: VarId, y: VarId) -> bool {
        self.lookup[self.cell(x, y)].is_some()
    }

    /// Add an arrow; its cell becomes computed. Returns `false` if an equal
    /// arrow was already present.
    pub fn push(&mut self, arrow: Arrow) -> bool {
        let c = self.cell(arrow.x, arrow.y);
        if !self.sorted.insert(arrow.clone()) {
            return false;
        }
        self.lookup[c].get_or_insert_with(Vec::new).push(arrow);
        self.pushed += 1;
        let size = self.sorted.len() as u64;
        if size > self.high_water {
            self.high_water = size;
        }
        true
    }

    /// Remove and return the best arrow.
    pub fn pop_best(&mut self) -> Option<Arrow> {
        let best = self.sorted.pop_first()?;
        let c = self.cell(best.x, best.y);
        if let Some(cell) = self.lookup[c].as_mut() {
            if let Some(pos) = cell.iter().position(|a| a == &best) {
                cell.swap_remove(pos);
            }
        }
        Some(best)
    }

    /// Drop every arrow for `(x, y)` and mark the cell uncomputed.
    /// Returns the number of arrows removed.
    pub fn clear_cell(&mut self, x: VarId, y: VarId) -> usize {
        let c = self.cell(x, y);
        let Some(cell) = self.lookup[c].take() else {
            return 0;
        };
        for a in &cell {
            self.sorted.remove(a);
        }
        cell.len()
    }

    /// Drop everything; all cells uncomputed.
    pub fn clear(&mut self) {
        self.sorted.clear();
        self.lookup.iter_mut().for_each(|c| *c = None);
    }

    /// Arrows currently indexed for `(x, y)`.
    #[must_use]
    pub fn arrows_for(&self, x: VarId, y: VarId) -> &[Arrow] {
        self.lookup[self.cell(x, y)].as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Largest number of arrows held at once.
    #[must_use]
    pub fn high_water(&self) -> u64 {
        self.high_water
    }

    /// Arrows accepted by [`ArrowIndex::push`] over the index's lifetime.
    #[must_use]
    pub fn pushed(&self) -> u64 {
        self.pushed
    }
}
