//! Local-score contract and the per-search score cache.

use std::collections::HashMap;

use ges_kernel::graph::dag::dag_from_pattern;
use ges_kernel::graph::{GraphError, GraphStore, VarId};

/// A decomposable score: the score of a DAG is the sum of
/// `local_score(v, parents(v))` over its variables.
///
/// Implementations must be deterministic. `None` means "not scorable"
/// (numerically degenerate); NaN or infinite values must never be returned
/// as `Some`.
pub trait LocalScore: Send + Sync {
    /// Number of variables the score is defined over.
    fn num_vars(&self) -> usize;

    /// Score of `target` given `parents` (ascending, no duplicates).
    fn local_score(&self, target: VarId, parents: &[VarId]) -> Option<f64>;

    /// `local_score(target, with) - local_score(target, without)`.
    ///
    /// Scores for which a difference is defined even when the individual
    /// terms are not may override this.
    fn local_score_diff(&self, target: VarId, with: &[VarId], without: &[VarId]) -> Option<f64> {
        let d = self.local_score(target, with)? - self.local_score(target, without)?;
        d.is_finite().then_some(d)
    }
}

/// Memoizing wrapper around a [`LocalScore`], owned by one search.
///
/// Entries are never evicted: the memo holds one entry per distinct
/// `(target, parents)` pair scored and is dropped with the search. Memory
/// therefore grows with [`Self::evaluations`], which the trace reports.
pub struct ScoreCache<'s> {
    scorer: &'s dyn LocalScore,
    /// Keyed on sorted, deduplicated parents. Undefined scores are cached as
    /// `None` too.
    memo: HashMap<(VarId, Vec<VarId>), Option<f64>>,
    evaluations: u64,
    hits: u64,
}

impl<'s> ScoreCache<'s> {
    #[must_use]
    pub fn new(scorer: &'s dyn LocalScore) -> Self {
        Self {
            scorer,
            memo: HashMap::new(),
            evaluations: 0,
            hits: 0,
        }
    }

    /// Memoized local score. `parents` need not be sorted.
    pub fn local_score(&mut self, target: VarId, parents: &[VarId]) -> Option<f64> {
        let mut key = parents.to_vec();
        key.sort_unstable();
        key.dedup();
        if let Some(&s) = self.memo.get(&(target, key.clone())) {
            self.hits += 1;
            return s;
        }
        self.evaluations += 1;
        let s = self
            .scorer
            .local_score(target, &key)
            .filter(|v| v.is_finite());
        self.memo.insert((target, key), s);
        s
    }

    /// `score(target, with) - score(target, without)`, or `None` if the
    /// difference is undefined.
    pub fn score_delta(&mut self, target: VarId, with: &[VarId], without: &[VarId]) -> Option<f64> {
        match (self.local_score(target, with), self.local_score(target, without)) {
            (Some(a), Some(b)) => Some(a - b).filter(|d| d.is_finite()),
            _ => {
                let mut w = with.to_vec();
                w.sort_unstable();
                let mut wo = without.to_vec();
                wo.sort_unstable();
                self.scorer
                    .local_score_diff(target, &w, &wo)
                    .filter(|d| d.is_finite())
            }
        }
    }

    /// Total score of the directed graph `dag`. Undirected edges are ignored.
    pub fn score_dag(&mut self, dag: &GraphStore) -> Option<f64> {
        let mut total = 0.0;
        for v in dag.var_ids() {
            total += self.local_score(v, &dag.parents(v))?;
        }
        Some(total)
    }

    /// Total score of a pattern, via a consistent DAG extension.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoConsistentExtension`] if the pattern has no
    /// DAG extension.
    pub fn score_pattern(&mut self, pattern: &GraphStore) -> Result<Option<f64>, GraphError> {
        let dag = dag_from_pattern(pattern)?;
        Ok(self.score_dag(&dag))
    }

    /// Distinct `(target, parents)` evaluations delegated to the scorer.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Lookups answered from the memo.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Entries currently held.
    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}
