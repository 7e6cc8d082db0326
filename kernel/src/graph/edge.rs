//! Edges and endpoint marks.

use std::fmt;

use crate::graph::variable::VarId;

/// Mark at one end of an edge.
///
/// `Circle` is never produced by the equivalence search; it exists so that
/// graphs from other algorithms share the same representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    Tail,
    Arrow,
    Circle,
}

/// An edge `node1 *-* node2` with one mark per end.
///
/// `endpoint1` is the mark at `node1`, `endpoint2` the mark at `node2`.
/// A directed edge `a --> b` is `(a, Tail, b, Arrow)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub node1: VarId,
    pub node2: VarId,
    pub endpoint1: Endpoint,
    pub endpoint2: Endpoint,
}

impl Edge {
    /// `from --> to`.
    #[must_use]
    pub const fn directed(from: VarId, to: VarId) -> Self {
        Self {
            node1: from,
            node2: to,
            endpoint1: Endpoint::Tail,
            endpoint2: Endpoint::Arrow,
        }
    }

    /// `a --- b`, normalized so that `node1 < node2`.
    #[must_use]
    pub fn undirected(a: VarId, b: VarId) -> Self {
        let (node1, node2) = if a <= b { (a, b) } else { (b, a) };
        Self {
            node1,
            node2,
            endpoint1: Endpoint::Tail,
            endpoint2: Endpoint::Tail,
        }
    }

    /// True for `a --> b` or `a <-- b`.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        matches!(
            (self.endpoint1, self.endpoint2),
            (Endpoint::Tail, Endpoint::Arrow) | (Endpoint::Arrow, Endpoint::Tail)
        )
    }

    /// True for `a --- b`.
    #[must_use]
    pub fn is_undirected(&self) -> bool {
        self.endpoint1 == Endpoint::Tail && self.endpoint2 == Endpoint::Tail
    }

    /// Tail node of a directed edge.
    #[must_use]
    pub fn tail(&self) -> Option<VarId> {
        match (self.endpoint1, self.endpoint2) {
            (Endpoint::Tail, Endpoint::Arrow) => Some(self.node1),
            (Endpoint::Arrow, Endpoint::Tail) => Some(self.node2),
            _ => None,
        }
    }

    /// Head node of a directed edge.
    #[must_use]
    pub fn head(&self) -> Option<VarId> {
        match (self.endpoint1, self.endpoint2) {
            (Endpoint::Tail, Endpoint::Arrow) => Some(self.node2),
            (Endpoint::Arrow, Endpoint::Tail) => Some(self.node1),
            _ => None,
        }
    }

    /// The endpoint other than `node`, if `node` is on this edge.
    #[must_use]
    pub fn distal(&self, node: VarId) -> Option<VarId> {
        if node == self.node1 {
            Some(self.node2)
        } else if node == self.node2 {
            Some(self.node1)
        } else {
            None
        }
    }

    /// Mark at `node`'s end of the edge.
    #[must_use]
    pub fn endpoint_at(&self, node: VarId) -> Option<Endpoint> {
        if node == self.node1 {
            Some(self.endpoint1)
        } else if node == self.node2 {
            Some(self.endpoint2)
        } else {
            None
        }
    }

    /// Next node when walking this edge from `node` along a semi-directed path.
    ///
    /// The walk may leave `node` only through a tail mark at `node`, i.e. via
    /// `node --> c` or `node --- c`, never against an arrowhead.
    #[must_use]
    pub fn traverse_semi_directed(&self, node: VarId) -> Option<VarId> {
        match self.endpoint_at(node)? {
            Endpoint::Tail => self.distal(node),
            Endpoint::Arrow | Endpoint::Circle => None,
        }
    }

    /// Canonical `(min, max)` adjacency key.
    #[must_use]
    pub fn pair(&self) -> (VarId, VarId) {
        if self.node1 <= self.node2 {
            (self.node1, self.node2)
        } else {
            (self.node2, self.node1)
        }
    }
}

fn mark_str(e: Endpoint, left: bool) -> &'static str {
    match (e, left) {
        (Endpoint::Tail, _) => "-",
        (Endpoint::Arrow, true) => "<",
        (Endpoint::Arrow, false) => ">",
        (Endpoint::Circle, _) => "o",
    }
}

impl Edge {
    /// The connector between the two node labels, e.g. `-->`.
    #[must_use]
    pub fn connector(&self) -> String {
        format!(
            "{}-{}",
            mark_str(self.endpoint1, true),
            mark_str(self.endpoint2, false)
        )
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.node1, self.connector(), self.node2)
    }
}
