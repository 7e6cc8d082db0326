//! `insert_edge` / `delete_edge`: the two graph mutations of the search.
//!
//! Both check every precondition before touching the graph, so a failure
//! leaves it unchanged. Validity in Chickering's sense (clique and path
//! conditions) is the caller's job via [`super::validity`]; the checks here
//! are structural only.

use crate::graph::store::GraphStore;
use crate::graph::variable::VarId;

/// Typed failure for operator application. Fail-closed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyFailure {
    /// The graph is not in a state the operator accepts.
    #[error("precondition not met: {detail}")]
    PreconditionNotMet { detail: String },
    /// The operator arguments are malformed (self pair, overlapping sets).
    #[error("argument mismatch: {detail}")]
    ArgumentMismatch { detail: String },
}

/// Insert(x, y, T): add `x --> y` and orient each `t --- y` as `t --> y`.
///
/// An existing undirected `x --- y` is replaced.
///
/// # Errors
///
/// - `ArgumentMismatch` if `x == y` or `T` contains `x` or `y`.
/// - `PreconditionNotMet` if `x` and `y` are joined by a directed edge, or
///   some `t` is not joined to `y` by an undirected edge.
pub fn insert_edge(
    graph: &mut GraphStore,
    x: VarId,
    y: VarId,
    t: &[VarId],
) -> Result<(), ApplyFailure> {
    if x == y {
        return Err(ApplyFailure::ArgumentMismatch {
            detail: format!("insert on self pair {x}"),
        });
    }
    if let Some(&bad) = t.iter().find(|&&n| n == x || n == y) {
        return Err(ApplyFailure::ArgumentMismatch {
            detail: format!("T contains endpoint {bad}"),
        });
    }
    if graph.is_adjacent(x, y) && !graph.is_undirected(x, y) {
        return Err(ApplyFailure::PreconditionNotMet {
            detail: format!("{x} and {y} already joined by a directed edge"),
        });
    }
    if let Some(&bad) = t.iter().find(|&&n| !graph.is_undirected(n, y)) {
        return Err(ApplyFailure::PreconditionNotMet {
            detail: format!("{bad} --- {y} is not an undirected edge"),
        });
    }

    graph.add_directed_edge(x, y);
    for &n in t {
        graph.add_directed_edge(n, y);
    }
    Ok(())
}

/// Delete(x, y, H): remove the `x`–`y` edge, orient each `y --- h` as
/// `y --> h`, and each undirected `x --- h` as `x --> h`.
///
/// # Errors
///
/// - `ArgumentMismatch` if `x == y` or `H` contains `x` or `y`.
/// - `PreconditionNotMet` if `x` and `y` are not adjacent, or some `h` is
///   not joined to `y` by an undirected edge.
pub fn delete_edge(
    graph: &mut GraphStore,
    x: VarId,
    y: VarId,
    h: &[VarId],
) -> Result<(), ApplyFailure> {
    if x == y {
        return Err(ApplyFailure::ArgumentMismatch {
            detail: format!("delete on self pair {x}"),
        });
    }
    if let Some(&bad) = h.iter().find(|&&n| n == x || n == y) {
        return Err(ApplyFailure::ArgumentMismatch {
            detail: format!("H contains endpoint {bad}"),
        });
    }
    if !graph.is_adjacent(x, y) {
        return Err(ApplyFailure::PreconditionNotMet {
            detail: format!("{x} and {y} are not adjacent"),
        });
    }
    if let Some(&bad) = h.iter().find(|&&n| !graph.is_undirected(y, n)) {
        return Err(ApplyFailure::PreconditionNotMet {
            detail: format!("{y} --- {bad} is not an undirected edge"),
        });
    }

    graph.remove_edge(x, y);
    for &n in h {
        graph.add_directed_edge(y, n);
        if graph.is_undirected(x, n) {
            graph.add_directed_edge(x, n);
        }
    }
    Ok(())
}
