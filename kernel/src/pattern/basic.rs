//! Reduction of a mixed graph to its basic pattern.

use crate::graph::store::GraphStore;

/// Undirect every directed edge `x --> y` that is not part of an unshielded
/// collider at `y`.
///
/// The edge keeps its orientation only if `y` has another parent not
/// adjacent to `x`. Decisions are taken against the input graph and applied
/// together, so the result does not depend on edge order. Returns the number
/// of edges undirected.
pub fn revert_to_basic_pattern(graph: &mut GraphStore) -> usize {
    let to_undirect: Vec<_> = graph
        .edges()
        .into_iter()
        .filter_map(|e| Some((e.tail()?, e.head()?)))
        .filter(|&(x, y)| {
            graph
                .parents(y)
                .into_iter()
                .all(|p| p == x || graph.is_adjacent(p, x))
        })
        .collect();

    for &(x, y) in &to_undirect {
        graph.add_undirected_edge(x, y);
    }
    to_undirect.len()
}
