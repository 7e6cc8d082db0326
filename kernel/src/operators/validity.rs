//! Neighbor sets and validity conditions for Insert(x, y, T) and
//! Delete(x, y, H).
//!
//! All node lists here are ascending `VarId` vectors without duplicates.

use crate::graph::store::GraphStore;
use crate::graph::variable::VarId;

/// `naYX`: nodes joined to `y` by an undirected edge and adjacent to `x`.
#[must_use]
pub fn na_yx(graph: &GraphStore, x: VarId, y: VarId) -> Vec<VarId> {
    graph
        .undirected_neighbors(y)
        .into_iter()
        .filter(|&z| z != x && graph.is_adjacent(z, x))
        .collect()
}

/// Candidate members of `T`: undirected neighbors of `y` not adjacent to `x`.
#[must_use]
pub fn t_neighbors(graph: &GraphStore, x: VarId, y: VarId) -> Vec<VarId> {
    graph
        .undirected_neighbors(y)
        .into_iter()
        .filter(|&z| z != x && !graph.is_adjacent(z, x))
        .collect()
}

/// Sorted union of two sorted lists.
#[must_use]
pub fn union(a: &[VarId], b: &[VarId]) -> Vec<VarId> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Elements of `a` not in `b`.
#[must_use]
pub fn difference(a: &[VarId], b: &[VarId]) -> Vec<VarId> {
    a.iter().copied().filter(|v| b.binary_search(v).is_err()).collect()
}

/// Insert(x, y, T) is valid iff `T ∪ naYX` is a clique and every
/// semi-directed path from `y` to `x` passes through `T ∪ naYX`.
#[must_use]
pub fn valid_insert(graph: &GraphStore, x: VarId, y: VarId, t: &[VarId], na_yx: &[VarId]) -> bool {
    let cond = union(t, na_yx);
    graph.is_clique(&cond) && !graph.exists_unblocked_semi_directed_path(y, x, &cond)
}

/// Delete(x, y, H) is valid iff `naYX \ H` is a clique.
#[must_use]
pub fn valid_delete(graph: &GraphStore, h: &[VarId], na_yx: &[VarId]) -> bool {
    graph.is_clique(&difference(na_yx, h))
}
