//! Background knowledge: forbidden and required edge directions.
//!
//! [`Knowledge`] is the name-based form a caller assembles. Before a search
//! starts it is resolved against the search's [`VariableSet`] into a
//! [`ResolvedKnowledge`], an index-based view answering every query in O(1).
//!
//! An ordered pair `(from, to)` is forbidden if it is listed explicitly, if
//! `from` sits in a later temporal tier than `to`, or if both share a tier
//! marked forbidden-within. It is required only if listed explicitly.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::store::GraphStore;
use crate::graph::variable::{VarId, VariableSet};

/// Knowledge that cannot be resolved against a variable set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KnowledgeError {
    #[error("knowledge names unknown variable: {name}")]
    UnknownVariable { name: String },
    #[error("edge {from} --> {to} is both required and forbidden")]
    Conflict { from: String, to: String },
    #[error("self edge {name} --> {name} in knowledge")]
    SelfEdge { name: String },
}

/// Name-based background knowledge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Knowledge {
    forbidden: BTreeSet<(String, String)>,
    required: BTreeSet<(String, String)>,
    tiers: Vec<BTreeSet<String>>,
    forbidden_within: BTreeSet<usize>,
}

impl Knowledge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid `from --> to`.
    pub fn set_forbidden(&mut self, from: &str, to: &str) {
        self.forbidden.insert((from.to_string(), to.to_string()));
    }

    /// Require `from --> to`.
    pub fn set_required(&mut self, from: &str, to: &str) {
        self.required.insert((from.to_string(), to.to_string()));
    }

    /// Put `name` in temporal tier `tier`, removing it from any other tier.
    pub fn add_to_tier(&mut self, tier: usize, name: &str) {
        for t in &mut self.tiers {
            t.remove(name);
        }
        if self.tiers.len() <= tier {
            self.tiers.resize_with(tier + 1, BTreeSet::new);
        }
        self.tiers[tier].insert(name.to_string());
    }

    /// Forbid (or allow) every edge between two members of `tier`.
    pub fn set_tier_forbidden_within(&mut self, tier: usize, forbidden: bool) {
        if forbidden {
            self.forbidden_within.insert(tier);
        } else {
            self.forbidden_within.remove(&tier);
        }
    }

    #[must_use]
    pub fn num_tiers(&self) -> usize {
        self.tiers.len()
    }

    /// Tier of `name`, if it was assigned one.
    #[must_use]
    pub fn tier_of(&self, name: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.contains(name))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty() && self.required.is_empty() && self.tiers.is_empty()
    }

    /// True if `from --> to` is forbidden explicitly or by tiers.
    #[must_use]
    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        if self.forbidden.contains(&(from.to_string(), to.to_string())) {
            return true;
        }
        self.is_forbidden_by_tiers(from, to)
    }

    /// True if tiers alone forbid `from --> to`.
    #[must_use]
    pub fn is_forbidden_by_tiers(&self, from: &str, to: &str) -> bool {
        match (self.tier_of(from), self.tier_of(to)) {
            (Some(a), Some(b)) => a > b || (a == b && self.forbidden_within.contains(&a)),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_required(&self, from: &str, to: &str) -> bool {
        from != to && self.required.contains(&(from.to_string(), to.to_string()))
    }

    /// True iff neither direction between `a` and `b` is required.
    #[must_use]
    pub fn no_edge_required(&self, a: &str, b: &str) -> bool {
        !(self.is_required(a, b) || self.is_required(b, a))
    }

    /// Explicitly forbidden pairs, sorted.
    pub fn forbidden_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forbidden.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// Required pairs, sorted.
    pub fn required_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// True if some directed edge of `graph` is forbidden.
    #[must_use]
    pub fn is_violated_by(&self, graph: &GraphStore) -> bool {
        let vars = graph.variables();
        graph.edges().iter().any(|e| match (e.tail(), e.head()) {
            (Some(t), Some(h)) => self.is_forbidden(vars.name(t), vars.name(h)),
            _ => false,
        })
    }

    /// Resolve names against `variables`.
    ///
    /// # Errors
    ///
    /// [`KnowledgeError::UnknownVariable`] for any name not in `variables`,
    /// [`KnowledgeError::SelfEdge`] for `a --> a`, and
    /// [`KnowledgeError::Conflict`] if a direction is both required and
    /// forbidden.
    pub fn resolve(&self, variables: &VariableSet) -> Result<ResolvedKnowledge, KnowledgeError> {
        let lookup = |name: &str| {
            variables
                .id(name)
                .ok_or_else(|| KnowledgeError::UnknownVariable {
                    name: name.to_string(),
                })
        };

        let n = variables.len();
        let mut resolved = ResolvedKnowledge::unrestricted(n);

        for (from, to) in &self.forbidden {
            let (a, b) = (lookup(from)?, lookup(to)?);
            if a == b {
                return Err(KnowledgeError::SelfEdge { name: from.clone() });
            }
            resolved.explicit_forbidden.push((a, b));
        }
        for (from, to) in &self.required {
            let (a, b) = (lookup(from)?, lookup(to)?);
            if a == b {
                return Err(KnowledgeError::SelfEdge { name: from.clone() });
            }
            resolved.required_list.push((a, b));
            resolved.required[a.index() * n + b.index()] = true;
        }

        let mut tier_of: BTreeMap<VarId, usize> = BTreeMap::new();
        for (i, tier) in self.tiers.iter().enumerate() {
            for name in tier {
                tier_of.insert(lookup(name)?, i);
            }
        }

        for &(a, b) in &resolved.explicit_forbidden {
            resolved.forbidden[a.index() * n + b.index()] = true;
        }
        for (&a, &ta) in &tier_of {
            for (&b, &tb) in &tier_of {
                if a != b && (ta > tb || (ta == tb && self.forbidden_within.contains(&ta))) {
                    resolved.forbidden[a.index() * n + b.index()] = true;
                }
            }
        }

        for &(a, b) in &resolved.required_list {
            if resolved.forbidden[a.index() * n + b.index()] {
                return Err(KnowledgeError::Conflict {
                    from: variables.name(a).to_string(),
                    to: variables.name(b).to_string(),
                });
            }
        }

        resolved.empty = self.is_empty();
        Ok(resolved)
    }

    /// JSON projection with sorted pair lists and tiers.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let pairs = |set: &BTreeSet<(String, String)>| {
            set.iter()
                .map(|(a, b)| serde_json::json!([a, b]))
                .collect::<Vec<_>>()
        };
        serde_json::json!({
            "forbidden": pairs(&self.forbidden),
            "forbidden_within_tiers": self.forbidden_within.iter().collect::<Vec<_>>(),
            "required": pairs(&self.required),
            "tiers": self.tiers.iter().map(|t| t.iter().collect::<Vec<_>>()).collect::<Vec<_>>(),
        })
    }
}

/// Index-based knowledge for one variable set. Read-only during search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKnowledge {
    n: usize,
    forbidden: Vec<bool>,
    required: Vec<bool>,
    explicit_forbidden: Vec<(VarId, VarId)>,
    required_list: Vec<(VarId, VarId)>,
    empty: bool,
}

impl ResolvedKnowledge {
    /// No constraints over `n` variables.
    #[must_use]
    pub fn unrestricted(n: usize) -> Self {
        Self {
            n,
            forbidden: vec![false; n * n],
            required: vec![false; n * n],
            explicit_forbidden: Vec::new(),
            required_list: Vec::new(),
            empty: true,
        }
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    #[must_use]
    pub fn is_forbidden(&self, from: VarId, to: VarId) -> bool {
        self.forbidden[from.index() * self.n + to.index()]
    }

    #[must_use]
    pub fn is_required(&self, from: VarId, to: VarId) -> bool {
        self.required[from.index() * self.n + to.index()]
    }

    #[must_use]
    pub fn no_edge_required(&self, a: VarId, b: VarId) -> bool {
        !(self.is_required(a, b) || self.is_required(b, a))
    }

    /// Explicitly forbidden pairs in name order.
    #[must_use]
    pub fn forbidden_edges(&self) -> &[(VarId, VarId)] {
        &self.explicit_forbidden
    }

    /// Required pairs in name order.
    #[must_use]
    pub fn required_edges(&self) -> &[(VarId, VarId)] {
        &self.required_list
    }

    /// True if some directed edge of `graph` is forbidden.
    #[must_use]
    pub fn is_violated_by(&self, graph: &GraphStore) -> bool {
        graph.edges().iter().any(|e| match (e.tail(), e.head()) {
            (Some(t), Some(h)) => self.is_forbidden(t, h),
            _ => false,
        })
    }
}
