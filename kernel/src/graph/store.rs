//! `GraphStore`: the mutable mixed graph the search operates on.
//!
//! Storage is a dense `n × n` endpoint matrix plus sorted adjacency sets.
//! `marks[a][b]` holds the mark at `b`'s end of the `a`–`b` edge, so edge
//! presence is symmetric and each orientation query is O(1). Adjacency sets
//! are `BTreeSet`s so that every iteration is in ascending `VarId` order.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use crate::graph::edge::{Edge, Endpoint};
use crate::graph::variable::{VarId, VariableSet};
use crate::graph::GraphError;

/// Mutable graph over a fixed variable set.
#[derive(Debug, Clone)]
pub struct GraphStore {
    variables: Arc<VariableSet>,
    marks: Vec<Option<Endpoint>>,
    adjacency: Vec<BTreeSet<VarId>>,
    edge_count: usize,
}

impl PartialEq for GraphStore {
    fn eq(&self, other: &Self) -> bool {
        self.same_variables(other) && self.marks == other.marks
    }
}

impl Eq for GraphStore {}

impl GraphStore {
    /// Empty graph over `variables`.
    #[must_use]
    pub fn new(variables: Arc<VariableSet>) -> Self {
        let n = variables.len();
        Self {
            variables,
            marks: vec![None; n * n],
            adjacency: vec![BTreeSet::new(); n],
            edge_count: 0,
        }
    }

    /// Build a graph from `(from, to)` name pairs, all directed.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownVariable`] or [`GraphError::SelfLoop`].
    pub fn from_directed_names(
        variables: Arc<VariableSet>,
        edges: &[(&str, &str)],
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new(variables);
        for &(a, b) in edges {
            let (x, y) = graph.resolve_pair(a, b)?;
            graph.add_directed_edge(x, y);
        }
        Ok(graph)
    }

    /// Build a graph from `(a, b)` name pairs, all undirected.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownVariable`] or [`GraphError::SelfLoop`].
    pub fn from_undirected_names(
        variables: Arc<VariableSet>,
        edges: &[(&str, &str)],
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new(variables);
        for &(a, b) in edges {
            let (x, y) = graph.resolve_pair(a, b)?;
            graph.add_undirected_edge(x, y);
        }
        Ok(graph)
    }

    fn resolve_pair(&self, a: &str, b: &str) -> Result<(VarId, VarId), GraphError> {
        let x = self.variables.id(a).ok_or_else(|| GraphError::UnknownVariable {
            name: a.to_string(),
        })?;
        let y = self.variables.id(b).ok_or_else(|| GraphError::UnknownVariable {
            name: b.to_string(),
        })?;
        if x == y {
            return Err(GraphError::SelfLoop {
                name: a.to_string(),
            });
        }
        Ok((x, y))
    }

    #[must_use]
    pub fn variables(&self) -> &Arc<VariableSet> {
        &self.variables
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.adjacency.len()
    }

    pub fn var_ids(&self) -> impl Iterator<Item = VarId> + '_ {
        self.variables.ids()
    }

    /// True if both graphs are defined over the same variable names.
    #[must_use]
    pub fn same_variables(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.variables, &other.variables) || self.variables == other.variables
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn slot(&self, a: VarId, b: VarId) -> usize {
        a.index() * self.adjacency.len() + b.index()
    }

    /// Mark at `b`'s end of the `a`–`b` edge.
    #[must_use]
    pub fn endpoint(&self, a: VarId, b: VarId) -> Option<Endpoint> {
        self.marks[self.slot(a, b)]
    }

    #[must_use]
    pub fn is_adjacent(&self, a: VarId, b: VarId) -> bool {
        a != b && self.marks[self.slot(a, b)].is_some()
    }

    /// Adjacent nodes of `a` in ascending order.
    pub fn adjacents(&self, a: VarId) -> impl Iterator<Item = VarId> + '_ {
        self.adjacency[a.index()].iter().copied()
    }

    #[must_use]
    pub fn degree(&self, a: VarId) -> usize {
        self.adjacency[a.index()].len()
    }

    /// The edge between `a` and `b`, oriented as stored.
    #[must_use]
    pub fn edge_between(&self, a: VarId, b: VarId) -> Option<Edge> {
        let at_b = self.endpoint(a, b)?;
        let at_a = self.endpoint(b, a)?;
        let edge = match (at_a, at_b) {
            (Endpoint::Tail, Endpoint::Arrow) => Edge::directed(a, b),
            (Endpoint::Arrow, Endpoint::Tail) => Edge::directed(b, a),
            (Endpoint::Tail, Endpoint::Tail) => Edge::undirected(a, b),
            (e1, e2) => {
                let (node1, node2, endpoint1, endpoint2) = if a <= b {
                    (a, b, e1, e2)
                } else {
                    (b, a, e2, e1)
                };
                Edge {
                    node1,
                    node2,
                    endpoint1,
                    endpoint2,
                }
            }
        };
        Some(edge)
    }

    /// All edges, ordered by `(min, max)` adjacency pair.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        let mut out = Vec::with_capacity(self.edge_count);
        for a in self.var_ids() {
            for &b in self.adjacency[a.index()].range(a..) {
                if let Some(e) = self.edge_between(a, b) {
                    out.push(e);
                }
            }
        }
        out
    }

    /// Edges touching `a`.
    #[must_use]
    pub fn edges_of(&self, a: VarId) -> Vec<Edge> {
        self.adjacents(a)
            .filter_map(|b| self.edge_between(a, b))
            .collect()
    }

    /// Insert or replace the edge between `edge.node1` and `edge.node2`.
    pub fn add_edge(&mut self, edge: Edge) {
        let (a, b) = (edge.node1, edge.node2);
        debug_assert_ne!(a, b, "self loops are not representable");
        if !self.is_adjacent(a, b) {
            self.edge_count += 1;
            self.adjacency[a.index()].insert(b);
            self.adjacency[b.index()].insert(a);
        }
        let ab = self.slot(a, b);
        let ba = self.slot(b, a);
        self.marks[ab] = Some(edge.endpoint2);
        self.marks[ba] = Some(edge.endpoint1);
    }

    /// Set `from --> to`, replacing any existing edge between them.
    pub fn add_directed_edge(&mut self, from: VarId, to: VarId) {
        self.add_edge(Edge::directed(from, to));
    }

    /// Set `a --- b`, replacing any existing edge between them.
    pub fn add_undirected_edge(&mut self, a: VarId, b: VarId) {
        self.add_edge(Edge::undirected(a, b));
    }

    /// Remove the edge between `a` and `b`. Returns `false` if there was none.
    pub fn remove_edge(&mut self, a: VarId, b: VarId) -> bool {
        if !self.is_adjacent(a, b) {
            return false;
        }
        let ab = self.slot(a, b);
        let ba = self.slot(b, a);
        self.marks[ab] = None;
        self.marks[ba] = None;
        self.adjacency[a.index()].remove(&b);
        self.adjacency[b.index()].remove(&a);
        self.edge_count -= 1;
        true
    }

    /// Remove every edge.
    pub fn clear_edges(&mut self) {
        self.marks.iter_mut().for_each(|m| *m = None);
        self.adjacency.iter_mut().for_each(BTreeSet::clear);
        self.edge_count = 0;
    }

    /// True for `a --> b`.
    #[must_use]
    pub fn is_parent_of(&self, a: VarId, b: VarId) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Arrow) && self.endpoint(b, a) == Some(Endpoint::Tail)
    }

    /// True for `a --- b`.
    #[must_use]
    pub fn is_undirected(&self, a: VarId, b: VarId) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Tail) && self.endpoint(b, a) == Some(Endpoint::Tail)
    }

    /// Parents of `y`, ascending.
    #[must_use]
    pub fn parents(&self, y: VarId) -> Vec<VarId> {
        self.adjacents(y).filter(|&p| self.is_parent_of(p, y)).collect()
    }

    /// Children of `x`, ascending.
    #[must_use]
    pub fn children(&self, x: VarId) -> Vec<VarId> {
        self.adjacents(x).filter(|&c| self.is_parent_of(x, c)).collect()
    }

    /// Nodes joined to `y` by an undirected edge, ascending.
    #[must_use]
    pub fn undirected_neighbors(&self, y: VarId) -> Vec<VarId> {
        self.adjacents(y).filter(|&z| self.is_undirected(y, z)).collect()
    }

    /// True iff every pair in `nodes` is adjacent. O(k²).
    #[must_use]
    pub fn is_clique(&self, nodes: &[VarId]) -> bool {
        for (i, &a) in nodes.iter().enumerate() {
            for &b in &nodes[i + 1..] {
                if !self.is_adjacent(a, b) {
                    return false;
                }
            }
        }
        true
    }

    /// True if a semi-directed path leads from `from` to `to` without passing
    /// through any node in `blocked`.
    ///
    /// Breadth-first; an edge is walked only through a tail mark at the
    /// current node. Visited state is local to the call.
    #[must_use]
    pub fn exists_unblocked_semi_directed_path(
        &self,
        from: VarId,
        to: VarId,
        blocked: &[VarId],
    ) -> bool {
        let n = self.num_vars();
        let mut is_blocked = vec![false; n];
        for b in blocked {
            is_blocked[b.index()] = true;
        }
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();
        visited[from.index()] = true;
        queue.push_back(from);

        while let Some(t) = queue.pop_front() {
            if t == to {
                return true;
            }
            for u in self.adjacents(t) {
                let Some(edge) = self.edge_between(t, u) else {
                    continue;
                };
                let Some(c) = edge.traverse_semi_directed(t) else {
                    continue;
                };
                if is_blocked[c.index()] {
                    continue;
                }
                if c == to {
                    return true;
                }
                if !visited[c.index()] {
                    visited[c.index()] = true;
                    queue.push_back(c);
                }
            }
        }
        false
    }

    /// True if `a == b` or a directed path `a --> ... --> b` exists.
    #[must_use]
    pub fn is_ancestor_of(&self, a: VarId, b: VarId) -> bool {
        if a == b {
            return true;
        }
        let mut visited = vec![false; self.num_vars()];
        let mut stack = vec![a];
        visited[a.index()] = true;
        while let Some(t) = stack.pop() {
            for c in self.children(t) {
                if c == b {
                    return true;
                }
                if !visited[c.index()] {
                    visited[c.index()] = true;
                    stack.push(c);
                }
            }
        }
        false
    }

    /// Copy of this graph with every edge made undirected.
    #[must_use]
    pub fn skeleton(&self) -> Self {
        let mut out = Self::new(Arc::clone(&self.variables));
        for e in self.edges() {
            out.add_undirected_edge(e.node1, e.node2);
        }
        out
    }

    /// Render an edge with variable names, e.g. `X --> Y`.
    #[must_use]
    pub fn edge_string(&self, edge: &Edge) -> String {
        format!(
            "{} {} {}",
            self.variables.name(edge.node1),
            edge.connector(),
            self.variables.name(edge.node2)
        )
    }

    /// JSON projection: variable names and named edges in `edges()` order.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "edges": self.edges().iter().map(|e| self.edge_string(e)).collect::<Vec<_>>(),
            "variables": self.variables.names(),
        })
    }
}
