//! Forward equivalence search: greedy Insert(x, y, T) until no valid
//! positive-bump insert remains.
//!
//! Arrow cells are evaluated once up front and afterwards only around edges
//! that an accepted step added or reoriented. Every popped arrow is checked
//! against the live graph first; if its `naYX`, `parents(y)` or `T` no longer
//! match, the cell is re-evaluated instead of applying a bump computed for a
//! different neighborhood.

use std::collections::BTreeSet;

use ges_kernel::graph::{Edge, VarId};
use ges_kernel::operators::apply::insert_edge;
use ges_kernel::operators::validity::{na_yx, t_neighbors, union, valid_insert};
use ges_kernel::pattern::rebuild_pattern;
use tracing::{info, trace};

use crate::arrow::Arrow;
use crate::arrow_index::ArrowIndex;
use crate::error::SearchError;
use crate::observer::SearchObserver;
use crate::state::{PhaseOutcome, SearchState};
use crate::subsets::subsets_up_to;
use crate::trace::{PhaseStatsV1, PhaseV1};

struct Forward<'s, 'a, O: SearchObserver + ?Sized> {
    state: &'s mut SearchState<'a>,
    observer: &'s mut O,
    index: ArrowIndex,
    stats: PhaseStatsV1,
}

pub(crate) fn run<O: SearchObserver + ?Sized>(
    state: &mut SearchState<'_>,
    observer: &mut O,
) -> Result<PhaseOutcome, SearchError> {
    let n = state.graph.num_vars();
    let mut fwd = Forward {
        state,
        observer,
        index: ArrowIndex::new(n),
        stats: PhaseStatsV1::default(),
    };
    let cancelled = fwd.run()?;
    fwd.stats.arrows_pushed = fwd.index.pushed();
    fwd.stats.index_high_water = fwd.index.high_water();
    Ok(PhaseOutcome {
        stats: fwd.stats,
        cancelled,
    })
}

impl<O: SearchObserver + ?Sized> Forward<'_, '_, O> {
    fn run(&mut self) -> Result<bool, SearchError> {
        info!(
            score = self.state.score,
            edges = self.state.graph.edge_count(),
            "forward search starting"
        );
        self.initialize();

        loop {
            if self.state.is_cancelled() {
                info!(steps = self.stats.steps_accepted, "forward search cancelled");
                return Ok(true);
            }
            let Some(arrow) = self.index.pop_best() else {
                break;
            };
            self.stats.arrows_scanned += 1;
            self.observer.arrow_scanned(PhaseV1::Forward, &arrow);

            let (x, y) = (arrow.x, arrow.y);
            let graph = &self.state.graph;

            if graph.is_adjacent(x, y) {
                self.stats.arrows_stale += 1;
                trace!(%x, %y, "discarding arrow: pair already adjacent");
                continue;
            }

            let t_still_fits = arrow
                .subset
                .iter()
                .all(|&t| graph.is_undirected(t, y) && !graph.is_adjacent(t, x));
            if na_yx(graph, x, y) != arrow.na_yx
                || graph.parents(y) != arrow.parents_y
                || !t_still_fits
            {
                self.stats.arrows_stale += 1;
                trace!(%x, %y, "re-evaluating stale arrow cell");
                self.index.clear_cell(x, y);
                self.evaluate_cell(x, y);
                continue;
            }

            if !valid_insert(graph, x, y, &arrow.subset, &arrow.na_yx) {
                self.stats.arrows_invalid += 1;
                trace!(%x, %y, bump = arrow.bump, "discarding invalid insert");
                continue;
            }

            self.state.check_bump(&arrow)?;
            self.apply(&arrow);
        }

        info!(
            score = self.state.score,
            edges = self.state.graph.edge_count(),
            steps = self.stats.steps_accepted,
            "forward search converged"
        );
        Ok(false)
    }

    fn apply(&mut self, arrow: &Arrow) {
        let before: BTreeSet<Edge> = self.state.graph.edges().into_iter().collect();

        if let Err(failure) = insert_edge(&mut self.state.graph, arrow.x, arrow.y, &arrow.subset) {
            self.stats.apply_failures += 1;
            trace!(%failure, "insert rejected");
            return;
        }

        let score_before = self.state.score;
        rebuild_pattern(&mut self.state.graph, Some(self.state.knowledge));
        self.state.advance_score(arrow.bump);
        self.stats.steps_accepted += 1;
        let step = self.state.record_step(PhaseV1::Forward, arrow, score_before);
        self.observer.step_accepted(&step, &self.state.graph);

        let changed: Vec<Edge> = self
            .state
            .graph
            .edges()
            .into_iter()
            .filter(|e| !before.contains(e))
            .collect();
        for e in &changed {
            self.clear_around(e.node1, e.node2);
        }
        for e in &changed {
            self.reevaluate_around(e.node1, e.node2);
        }
    }

    fn initialize(&mut self) {
        self.index.clear();
        let ids: Vec<VarId> = self.state.graph.var_ids().collect();
        for &y in &ids {
            for &x in &ids {
                self.evaluate_cell(x, y);
            }
        }
    }

    /// Cells whose arrows may depend on the edge `a`–`b`, each paired with
    /// the cell's `(x, y)`.
    fn cells_around(&self, a: VarId, b: VarId) -> Vec<(VarId, VarId)> {
        let graph = &self.state.graph;
        let mut cells = Vec::new();
        for w in graph.var_ids() {
            if w == a || w == b {
                continue;
            }
            if !graph.is_adjacent(w, a) {
                cells.push((w, a));
                if graph.is_adjacent(w, b) {
                    cells.push((a, w));
                }
            }
            if !graph.is_adjacent(w, b) {
                cells.push((w, b));
                if graph.is_adjacent(w, a) {
                    cells.push((b, w));
                }
            }
        }
        cells
    }

    fn clear_around(&mut self, a: VarId, b: VarId) {
        self.index.clear_cell(a, b);
        self.index.clear_cell(b, a);
        for (x, y) in self.cells_around(a, b) {
            self.index.clear_cell(x, y);
        }
    }

    fn reevaluate_around(&mut self, a: VarId, b: VarId) {
        for (x, y) in self.cells_around(a, b) {
            if !self.index.is_computed(x, y) {
                self.evaluate_cell(x, y);
            }
        }
    }

    /// Score every Insert(x, y, T) for the current graph and index the
    /// positive ones.
    fn evaluate_cell(&mut self, x: VarId, y: VarId) {
        self.index.mark_computed(x, y);
        if x == y {
            return;
        }
        let st = &mut *self.state;
        if st.knowledge.is_forbidden(x, y)
            || st.restriction.is_some_and(|r| !r.is_adjacent(x, y))
            || st.graph.is_adjacent(x, y)
        {
            return;
        }
        self.stats.cells_evaluated += 1;

        let na = na_yx(&st.graph, x, y);
        let parents = st.graph.parents(y);
        let base = union(&na, &parents);
        let candidates = t_neighbors(&st.graph, x, y);

        for t in subsets_up_to(&candidates, st.policy.t_subset_depth) {
            if t.iter().any(|&n| st.knowledge.is_forbidden(n, y)) {
                continue;
            }
            let without = union(&base, &t);
            let with = union(&without, &[x]);
            match st.cache.score_delta(y, &with, &without) {
                None => {
                    self.stats.candidates_degenerate += 1;
                    trace!(%x, %y, "insert candidate not scorable");
                }
                Some(bump) if bump > 0.0 => {
                    let arrow = Arrow {
                        bump,
                        x,
                        y,
                        subset: t,
                        na_yx: na.clone(),
                        parents_y: parents.clone(),
                    };
                    self.observer.arrow_pushed(PhaseV1::Forward, &arrow);
                    self.index.push(arrow);
                }
                Some(_) => {}
            }
        }
    }
}
