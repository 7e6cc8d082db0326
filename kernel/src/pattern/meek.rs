//! Meek's orientation rules R1–R4, applied to a fixed point.
//!
//! Every rule is phrased as a test on one undirected edge `a --- b`: does
//! the neighborhood force `a --> b`? A pass visits all undirected edges
//! (both directions) in visit order; passes repeat until none orients
//! anything.
//!
//! - R1: `c --> a`, `c` not adjacent to `b`.
//! - R2: `a --> c --> b`.
//! - R3: `a --- c`, `a --- d`, `c --> b`, `d --> b`, `c` not adjacent to `d`.
//! - R4: `a --- d`, `d --> c --> b`, `a` adjacent to `c`, `b` not adjacent
//!   to `d`.
//!
//! An orientation is skipped if knowledge forbids `a --> b`, requires
//! `b --> a`, or `b` is already an ancestor of `a`.

use crate::graph::store::GraphStore;
use crate::graph::variable::VarId;
use crate::knowledge::ResolvedKnowledge;

/// Which rule oriented an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MeekRule {
    R1,
    R2,
    R3,
    R4,
}

/// Fixed-point Meek orientation with knowledge precedence.
#[derive(Debug, Clone)]
pub struct MeekRules<'k> {
    knowledge: Option<&'k ResolvedKnowledge>,
    visit_order: Option<Vec<VarId>>,
}

impl<'k> MeekRules<'k> {
    #[must_use]
    pub fn new(knowledge: Option<&'k ResolvedKnowledge>) -> Self {
        Self {
            knowledge,
            visit_order: None,
        }
    }

    /// Visit nodes in `order` instead of ascending `VarId`.
    ///
    /// `order` must be a permutation of the graph's variables; any node it
    /// omits is visited afterwards in ascending order.
    #[must_use]
    pub fn with_visit_order(mut self, order: Vec<VarId>) -> Self {
        self.visit_order = Some(order);
        self
    }

    fn order(&self, graph: &GraphStore) -> Vec<VarId> {
        let mut order = self.visit_order.clone().unwrap_or_default();
        let mut seen = vec![false; graph.num_vars()];
        order.retain(|v| {
            let keep = v.index() < seen.len() && !seen[v.index()];
            if keep {
                seen[v.index()] = true;
            }
            keep
        });
        order.extend(graph.var_ids().filter(|v| !seen[v.index()]));
        order
    }

    /// Orient every edge forced by R1–R4. Returns the edges oriented, in
    /// the order they were oriented, with the rule that fired.
    pub fn orient_implied(&self, graph: &mut GraphStore) -> Vec<(VarId, VarId, MeekRule)> {
        let order = self.order(graph);
        let mut rank = vec![0usize; graph.num_vars()];
        for (i, v) in order.iter().enumerate() {
            rank[v.index()] = i;
        }

        let mut oriented = Vec::new();
        loop {
            let mut changed = false;
            for &a in &order {
                let mut neighbors = graph.undirected_neighbors(a);
                neighbors.sort_by_key(|b| rank[b.index()]);
                for b in neighbors {
                    if !graph.is_undirected(a, b) {
                        continue;
                    }
                    let Some(rule) = forcing_rule(graph, a, b) else {
                        continue;
                    };
                    if !self.may_orient(graph, a, b) {
                        continue;
                    }
                    graph.add_directed_edge(a, b);
                    oriented.push((a, b, rule));
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        oriented
    }

    fn may_orient(&self, graph: &GraphStore, a: VarId, b: VarId) -> bool {
        if let Some(k) = self.knowledge {
            if k.is_forbidden(a, b) || k.is_required(b, a) {
                return false;
            }
        }
        !graph.is_ancestor_of(b, a)
    }
}

/// The first rule that forces `a --> b` on the undirected edge `a --- b`.
#[must_use]
pub fn forcing_rule(graph: &GraphStore, a: VarId, b: VarId) -> Option<MeekRule> {
    // R1
    if graph
        .parents(a)
        .into_iter()
        .any(|c| c != b && !graph.is_adjacent(c, b))
    {
        return Some(MeekRule::R1);
    }

    // R2
    if graph
        .children(a)
        .into_iter()
        .any(|c| graph.is_parent_of(c, b))
    {
        return Some(MeekRule::R2);
    }

    let a_undirected = graph.undirected_neighbors(a);

    // R3
    let into_b: Vec<VarId> = a_undirected
        .iter()
        .copied()
        .filter(|&c| c != b && graph.is_parent_of(c, b))
        .collect();
    for (i, &c) in into_b.iter().enumerate() {
        if into_b[i + 1..].iter().any(|&d| !graph.is_adjacent(c, d)) {
            return Some(MeekRule::R3);
        }
    }

    // R4
    for d in a_undirected.into_iter().filter(|&d| d != b) {
        if graph.is_adjacent(b, d) {
            continue;
        }
        let fires = graph
            .children(d)
            .into_iter()
            .any(|c| c != a && graph.is_parent_of(c, b) && graph.is_adjacent(a, c));
        if fires {
            return Some(MeekRule::R4);
        }
    }

    None
}
