//! Pattern completion: basic pattern, knowledge orientation, Meek rules.
//!
//! Depends on `graph` and `knowledge`.

pub mod basic;
pub mod meek;

pub use basic::revert_to_basic_pattern;
pub use meek::{MeekRule, MeekRules};

use crate::graph::edge::Edge;
use crate::graph::store::GraphStore;
use crate::graph::variable::VarId;
use crate::knowledge::ResolvedKnowledge;

/// Replace whatever joins `from` and `to` with `from --> to`, unless that
/// would close a directed cycle. Returns whether the edge changed.
fn reorient(graph: &mut GraphStore, from: VarId, to: VarId) -> bool {
    if graph.is_parent_of(from, to) {
        return false;
    }
    let previous: Option<Edge> = graph.edge_between(from, to);
    graph.remove_edge(from, to);
    if graph.is_ancestor_of(to, from) {
        if let Some(e) = previous {
            graph.add_edge(e);
        }
        return false;
    }
    graph.add_directed_edge(from, to);
    true
}

/// Orient present edges as knowledge dictates: required directions first,
/// then the reverse of forbidden directions. Edges are never added or
/// removed. Returns the number of edges changed.
pub fn orient_by_knowledge(graph: &mut GraphStore, knowledge: &ResolvedKnowledge) -> usize {
    let mut changed = 0;
    for &(a, b) in knowledge.required_edges() {
        if graph.is_adjacent(a, b) && reorient(graph, a, b) {
            changed += 1;
        }
    }
    for e in graph.edges() {
        for (a, b) in [(e.node1, e.node2), (e.node2, e.node1)] {
            if knowledge.is_forbidden(a, b)
                && !knowledge.is_forbidden(b, a)
                && !graph.is_parent_of(b, a)
                && reorient(graph, b, a)
            {
                changed += 1;
            }
        }
    }
    changed
}

/// Add every required edge (absent ones included) and orient against
/// forbidden directions. Run once before search. Returns the number of
/// edges added or changed.
pub fn add_required_edges(graph: &mut GraphStore, knowledge: &ResolvedKnowledge) -> usize {
    let mut changed = 0;
    for &(a, b) in knowledge.required_edges() {
        if reorient(graph, a, b) {
            changed += 1;
        }
    }
    changed + orient_by_knowledge(graph, knowledge)
}

/// Reduce `graph` to the pattern of its equivalence class, respecting
/// knowledge.
pub fn rebuild_pattern(graph: &mut GraphStore, knowledge: Option<&ResolvedKnowledge>) {
    revert_to_basic_pattern(graph);
    if let Some(k) = knowledge {
        orient_by_knowledge(graph, k);
    }
    MeekRules::new(knowledge).orient_implied(graph);
}
