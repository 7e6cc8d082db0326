//! DAG utilities: cycle detection, topological order, and DAG extension of
//! a pattern.
//!
//! Cycle detection and ordering go through `petgraph` over the directed part
//! of a `GraphStore`; undirected edges are ignored.

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::store::GraphStore;
use crate::graph::variable::VarId;
use crate::graph::GraphError;

fn directed_part(graph: &GraphStore) -> DiGraph<VarId, ()> {
    let mut g = DiGraph::with_capacity(graph.num_vars(), graph.edge_count());
    let nodes: Vec<NodeIndex> = graph.var_ids().map(|v| g.add_node(v)).collect();
    for e in graph.edges() {
        if let (Some(t), Some(h)) = (e.tail(), e.head()) {
            g.add_edge(nodes[t.index()], nodes[h.index()], ());
        }
    }
    g
}

/// True if the directed edges of `graph` contain a cycle.
#[must_use]
pub fn has_directed_cycle(graph: &GraphStore) -> bool {
    is_cyclic_directed(&directed_part(graph))
}

/// A topological order of the directed edges, or `None` if cyclic.
#[must_use]
pub fn topological_order(graph: &GraphStore) -> Option<Vec<VarId>> {
    let g = directed_part(graph);
    let order = toposort(&g, None).ok()?;
    Some(order.into_iter().map(|ix| g[ix]).collect())
}

/// Orient every undirected edge of a pattern into a consistent DAG
/// extension (Dor and Tarsi).
///
/// Repeatedly picks the lowest-indexed remaining node `x` that has no
/// remaining children and whose undirected neighbors are each adjacent to
/// every other remaining neighbor of `x`; points its undirected edges into
/// `x` and removes it. The result has the same skeleton and v-structures as
/// the input.
///
/// # Errors
///
/// Returns [`GraphError::NoConsistentExtension`] if no such node exists at
/// some step.
pub fn dag_from_pattern(pattern: &GraphStore) -> Result<GraphStore, GraphError> {
    let n = pattern.num_vars();
    let mut dag = pattern.clone();
    let mut removed = vec![false; n];

    for _ in 0..n {
        let live = |v: &VarId| !removed[v.index()];
        let sink = pattern.var_ids().filter(|v| !removed[v.index()]).find(|&x| {
            let has_child = pattern.children(x).iter().any(live);
            if has_child {
                return false;
            }
            let neighbors: Vec<VarId> = pattern.adjacents(x).filter(live).collect();
            pattern
                .undirected_neighbors(x)
                .into_iter()
                .filter(live)
                .all(|y| {
                    neighbors
                        .iter()
                        .all(|&z| z == y || pattern.is_adjacent(y, z))
                })
        });

        let Some(x) = sink else {
            return Err(GraphError::NoConsistentExtension);
        };
        for y in pattern.undirected_neighbors(x) {
            if !removed[y.index()] {
                dag.add_directed_edge(y, x);
            }
        }
        removed[x.index()] = true;
    }

    Ok(dag)
}
