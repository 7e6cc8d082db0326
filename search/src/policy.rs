//! Search policy: the engine's scalar configuration.

use ges_kernel::proof::canon::{canonical_json_bytes, CanonError};
use ges_kernel::proof::hash::{canonical_hash, ContentHash};
use ges_kernel::proof::hash_domain::HashDomain;

use crate::error::SearchError;

/// Largest accepted `t_subset_depth`. Subset enumeration is exponential in
/// this value.
pub const MAX_T_SUBSET_DEPTH: usize = 8;

/// Search configuration. Validated once before any search step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPolicyV1 {
    /// Number of best `(score, pattern)` pairs retained for diagnostics.
    /// Zero disables the store.
    pub max_patterns_to_store: usize,
    /// Largest `T` subset tried per forward arrow cell.
    pub t_subset_depth: usize,
    /// Hold edges with a required direction fixed during the backward phase.
    pub protect_required_edges: bool,
}

impl SearchPolicyV1 {
    /// Check field ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidPolicy`] if `t_subset_depth` exceeds
    /// [`MAX_T_SUBSET_DEPTH`].
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.t_subset_depth > MAX_T_SUBSET_DEPTH {
            return Err(SearchError::InvalidPolicy {
                detail: format!(
                    "t_subset_depth {} exceeds maximum {MAX_T_SUBSET_DEPTH}",
                    self.t_subset_depth
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "max_patterns_to_store": self.max_patterns_to_store,
            "protect_required_edges": self.protect_required_edges,
            "schema_version": "search_policy.v1",
            "t_subset_depth": self.t_subset_depth,
        })
    }

    /// Content hash of the canonical policy snapshot.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`] from canonicalization.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_json_bytes(&self.to_json_value())?;
        Ok(canonical_hash(HashDomain::SearchPolicy, &bytes))
    }
}

impl Default for SearchPolicyV1 {
    fn default() -> Self {
        Self {
            max_patterns_to_store: 0,
            t_subset_depth: 1,
            protect_required_edges: true,
        }
    }
}
