//! `Arrow`: one candidate Insert or Delete with its score bump.

use std::cmp::Ordering;

use ges_kernel::graph::VarId;

/// A candidate operator application.
///
/// `subset` is `T` for an insert and `H` for a delete. `na_yx` and
/// `parents_y` are the graph's values when the arrow was scored; the
/// forward phase compares them against the live graph to detect stale
/// arrows.
#[derive(Debug, Clone)]
pub struct Arrow {
    pub bump: f64,
    pub x: VarId,
    pub y: VarId,
    pub subset: Vec<VarId>,
    pub na_yx: Vec<VarId>,
    pub parents_y: Vec<VarId>,
}

impl Arrow {
    /// The ordering key: larger bump first, then `x`, `y`, `subset`,
    /// `na_yx`, `parents_y` ascending. Bumps compare by IEEE total order.
    fn key_cmp(&self, other: &Self) -> Ordering {
        other
            .bump
            .total_cmp(&self.bump)
            .then_with(|| self.x.cmp(&other.x))
            .then_with(|| self.y.cmp(&other.y))
            .then_with(|| self.subset.cmp(&other.subset))
            .then_with(|| self.na_yx.cmp(&other.na_yx))
            .then_with(|| self.parents_y.cmp(&other.parents_y))
    }
}

impl PartialEq for Arrow {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for Arrow {}

impl PartialOrd for Arrow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Arrow {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key_cmp(other)
    }
}
