//! Backward equivalence search: greedy Delete(x, y, H) until no valid
//! positive-bump delete remains.
//!
//! Unlike the forward phase, the arrow index is rebuilt from scratch after
//! every accepted delete.

use ges_kernel::graph::VarId;
use ges_kernel::operators::apply::delete_edge;
use ges_kernel::operators::validity::{difference, na_yx, union, valid_delete};
use ges_kernel::pattern::rebuild_pattern;
use tracing::{info, trace};

use crate::arrow::Arrow;
use crate::arrow_index::ArrowIndex;
use crate::error::SearchError;
use crate::observer::SearchObserver;
use crate::state::{PhaseOutcome, SearchState};
use crate::subsets::subsets_up_to;
use crate::trace::{PhaseStatsV1, PhaseV1};

pub(crate) fn run<O: SearchObserver + ?Sized>(
    state: &mut SearchState<'_>,
    observer: &mut O,
) -> Result<PhaseOutcome, SearchError> {
    info!(
        score = state.score,
        edges = state.graph.edge_count(),
        "backward search starting"
    );
    let mut index = ArrowIndex::new(state.graph.num_vars());
    let mut stats = PhaseStatsV1::default();

    let cancelled = 'rounds: loop {
        initialize(state, observer, &mut index, &mut stats);

        loop {
            if state.is_cancelled() {
                break 'rounds true;
            }
            let Some(arrow) = index.pop_best() else {
                break 'rounds false;
            };
            stats.arrows_scanned += 1;
            observer.arrow_scanned(PhaseV1::Backward, &arrow);

            let (x, y) = (arrow.x, arrow.y);
            if !valid_delete(&state.graph, &arrow.subset, &arrow.na_yx) {
                stats.arrows_invalid += 1;
                trace!(%x, %y, bump = arrow.bump, "discarding invalid delete");
                continue;
            }
            state.check_bump(&arrow)?;

            if let Err(failure) = delete_edge(&mut state.graph, x, y, &arrow.subset) {
                stats.apply_failures += 1;
                trace!(%failure, "delete rejected");
                continue;
            }
            let score_before = state.score;
            rebuild_pattern(&mut state.graph, Some(state.knowledge));
            state.advance_score(arrow.bump);
            stats.steps_accepted += 1;
            let step = state.record_step(PhaseV1::Backward, &arrow, score_before);
            observer.step_accepted(&step, &state.graph);
            continue 'rounds;
        }
    };

    stats.arrows_pushed = index.pushed();
    stats.index_high_water = index.high_water();
    if cancelled {
        info!(steps = stats.steps_accepted, "backward search cancelled");
    } else {
        info!(
            score = state.score,
            edges = state.graph.edge_count(),
            steps = stats.steps_accepted,
            "backward search converged"
        );
    }
    Ok(PhaseOutcome { stats, cancelled })
}

fn initialize<O: SearchObserver + ?Sized>(
    state: &mut SearchState<'_>,
    observer: &mut O,
    index: &mut ArrowIndex,
    stats: &mut PhaseStatsV1,
) {
    index.clear();
    for e in state.graph.edges() {
        let (a, b) = (e.node1, e.node2);
        if state.policy.protect_required_edges && !state.knowledge.no_edge_required(a, b) {
            continue;
        }
        match (e.tail(), e.head()) {
            (Some(t), Some(h)) => evaluate_cell(state, observer, index, stats, t, h),
            _ => {
                evaluate_cell(state, observer, index, stats, a, b);
                evaluate_cell(state, observer, index, stats, b, a);
            }
        }
    }
}

/// Score every Delete(x, y, H) for the `x`–`y` edge and index the positive
/// ones.
fn evaluate_cell<O: SearchObserver + ?Sized>(
    state: &mut SearchState<'_>,
    observer: &mut O,
    index: &mut ArrowIndex,
    stats: &mut PhaseStatsV1,
    x: VarId,
    y: VarId,
) {
    index.mark_computed(x, y);
    if !state.graph.is_adjacent(x, y) {
        return;
    }
    stats.cells_evaluated += 1;

    let na = na_yx(&state.graph, x, y);
    let parents = state.graph.parents(y);
    let parents_without_x: Vec<VarId> = parents.iter().copied().filter(|&p| p != x).collect();
    let parents_with_x = union(&parents, &[x]);

    for h in subsets_up_to(&na, na.len()) {
        let forbidden = h.iter().any(|&n| {
            state.knowledge.is_forbidden(y, n)
                || (state.graph.is_undirected(x, n) && state.knowledge.is_forbidden(x, n))
        });
        if forbidden {
            continue;
        }
        let rest = difference(&na, &h);
        let removed = union(&rest, &parents_without_x);
        let kept = union(&rest, &parents_with_x);
        match state.cache.score_delta(y, &removed, &kept) {
            None => {
                stats.candidates_degenerate += 1;
                trace!(%x, %y, "delete candidate not scorable");
            }
            Some(bump) if bump > 0.0 => {
                let arrow = Arrow {
                    bump,
                    x,
                    y,
                    subset: h,
                    na_yx: na.clone(),
                    parents_y: parents.clone(),
                };
                observer.arrow_pushed(PhaseV1::Backward, &arrow);
                index.push(arrow);
            }
            Some(_) => {}
        }
    }
}
