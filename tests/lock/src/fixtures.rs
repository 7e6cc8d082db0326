//! Linear SEM fixtures with known structure.
//!
//! Coefficients are positive throughout so that no two paths cancel and the
//! implied covariance is faithful to the DAG.

use std::sync::Arc;

use ges_harness::covariance::CovarianceMatrix;
use ges_harness::linear_sem::LinearSem;
use ges_kernel::graph::{GraphStore, VariableSet};

/// Sample size attached to fixture covariances.
pub const SAMPLE_SIZE: usize = 1000;

/// # Panics
///
/// Panics on duplicate or empty names.
#[must_use]
pub fn vars(names: &[&str]) -> Arc<VariableSet> {
    Arc::new(VariableSet::new(names.iter().copied()).unwrap())
}

/// `V0, V1, ...`
#[must_use]
pub fn numbered_vars(n: usize) -> Arc<VariableSet> {
    let names: Vec<String> = (0..n).map(|i| format!("V{i}")).collect();
    Arc::new(VariableSet::new(names).unwrap())
}

/// Build a SEM from named edges with a common coefficient.
///
/// # Panics
///
/// Panics on unknown names or a non-finite coefficient.
#[must_use]
pub fn sem(names: &[&str], edges: &[(&str, &str)], coef: f64) -> LinearSem {
    edges
        .iter()
        .fold(LinearSem::new(vars(names)), |m, &(a, b)| {
            m.with_edge(a, b, coef).unwrap()
        })
}

/// `X --> Y --> Z`.
#[must_use]
pub fn chain_sem() -> LinearSem {
    sem(&["X", "Y", "Z"], &[("X", "Y"), ("Y", "Z")], 0.8)
}

/// `X --> Z <-- Y`.
#[must_use]
pub fn collider_sem() -> LinearSem {
    sem(&["X", "Y", "Z"], &[("X", "Z"), ("Y", "Z")], 0.8)
}

/// `A --> B --> D <-- C <-- A`.
#[must_use]
pub fn diamond_sem() -> LinearSem {
    sem(
        &["A", "B", "C", "D"],
        &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        0.8,
    )
}

/// Five variables, two v-structures and a propagated orientation.
#[must_use]
pub fn five_node_sem() -> LinearSem {
    sem(
        &["A", "B", "C", "D", "E"],
        &[("A", "C"), ("B", "C"), ("C", "D"), ("B", "E"), ("D", "E")],
        0.7,
    )
}

/// Edges of a random DAG over `order.len()` nodes: bit `k` of `mask`
/// selects the `k`-th pair `(i, j)`, `i < j`, oriented
/// `order[i] --> order[j]`.
#[must_use]
pub fn random_dag_edges(order: &[usize], mask: u64) -> Vec<(usize, usize)> {
    let n = order.len();
    let mut edges = Vec::new();
    let mut bit = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            if bit < 64 && mask & (1 << bit) != 0 {
                edges.push((order[i], order[j]));
            }
            bit += 1;
        }
    }
    edges
}

/// SEM over `V0..V{n-1}` with the given index edges. Coefficients vary
/// deterministically in `[0.5, 0.9]`.
///
/// # Panics
///
/// Panics if an index is out of range or an edge is a self loop.
#[must_use]
pub fn numbered_sem(n: usize, edges: &[(usize, usize)]) -> LinearSem {
    let variables = numbered_vars(n);
    let mut model = LinearSem::new(Arc::clone(&variables));
    for &(a, b) in edges {
        let coef = [0.5, 0.6, 0.7, 0.8, 0.9][(a * 7 + b * 3) % 5];
        model = model
            .with_edge(&format!("V{a}"), &format!("V{b}"), coef)
            .unwrap();
    }
    model
}

/// # Panics
///
/// Panics if the model is cyclic.
#[must_use]
pub fn covariance_of(model: &LinearSem) -> CovarianceMatrix {
    model.implied_covariance(SAMPLE_SIZE).unwrap()
}

/// DAG over `V0..V{n-1}` with the given index edges.
#[must_use]
pub fn numbered_dag(n: usize, edges: &[(usize, usize)]) -> GraphStore {
    numbered_sem(n, edges).dag()
}
