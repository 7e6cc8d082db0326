//! Variable identities.
//!
//! A [`VarId`] is a dense index into a [`VariableSet`]. The set is fixed once a
//! search begins; ordering of `VarId` is the iteration order everywhere in the
//! engine.

use std::collections::BTreeMap;
use std::fmt;

use crate::graph::GraphError;

/// Dense, totally ordered variable index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    /// Construct from a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The index as `usize`, for matrix addressing.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Ordered, duplicate-free set of named variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSet {
    names: Vec<String>,
    by_name: BTreeMap<String, VarId>,
}

impl VariableSet {
    /// Build a variable set from names in index order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyVariableName`] or
    /// [`GraphError::DuplicateVariable`] for malformed name lists, and
    /// [`GraphError::TooManyVariables`] if the count does not fit a `u32`.
    pub fn new<I, S>(names: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if u32::try_from(names.len()).is_err() {
            return Err(GraphError::TooManyVariables { count: names.len() });
        }

        let mut by_name = BTreeMap::new();
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(GraphError::EmptyVariableName { index: i });
            }
            #[allow(clippy::cast_possible_truncation)]
            let id = VarId(i as u32);
            if by_name.insert(name.clone(), id).is_some() {
                return Err(GraphError::DuplicateVariable { name: name.clone() });
            }
        }

        Ok(Self { names, by_name })
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Look up a variable by name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    /// Name of a variable.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this set.
    #[must_use]
    pub fn name(&self, id: VarId) -> &str {
        &self.names[id.index()]
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> + '_ {
        #[allow(clippy::cast_possible_truncation)]
        (0..self.names.len()).map(|i| VarId(i as u32))
    }

    /// All names in index order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Render a list of ids as names, e.g. `[X, Z]`.
    #[must_use]
    pub fn render(&self, ids: &[VarId]) -> String {
        let parts: Vec<&str> = ids.iter().map(|&v| self.name(v)).collect();
        format!("[{}]", parts.join(", "))
    }
}
