//! JSON run configuration for the harness.
//!
//! ```json
//! {
//!   "penalty_discount": 2.0,
//!   "t_subset_depth": 1,
//!   "knowledge": {
//!     "forbidden": [["Y", "X"]],
//!     "tiers": [["X"], ["Y", "Z"]]
//!   }
//! }
//! ```
//!
//! Every field is optional. Unknown fields are rejected.

use ges_kernel::knowledge::Knowledge;
use ges_kernel::proof::canon::{canonical_json_bytes, f64_value, CanonError};
use ges_kernel::proof::hash::{canonical_hash, ContentHash};
use ges_kernel::proof::hash_domain::HashDomain;
use ges_search::policy::MAX_T_SUBSET_DEPTH;
use ges_search::SearchPolicyV1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid run configuration: {detail}")]
    Parse { detail: String },

    #[error("penalty_discount must be finite and non-negative, got {value}")]
    InvalidPenalty { value: f64 },

    #[error("structure_prior must be finite and non-negative, got {value}")]
    InvalidStructurePrior { value: f64 },

    #[error("t_subset_depth {value} exceeds maximum {max}", max = MAX_T_SUBSET_DEPTH)]
    InvalidDepth { value: usize },

    #[error(transparent)]
    Canon(#[from] CanonError),
}

/// Background knowledge as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeConfigV1 {
    /// `[from, to]` pairs that must not appear as `from --> to`.
    #[serde(default)]
    pub forbidden: Vec<(String, String)>,
    /// `[from, to]` pairs that must appear as `from --> to`.
    #[serde(default)]
    pub required: Vec<(String, String)>,
    /// Temporal tiers, earliest first.
    #[serde(default)]
    pub tiers: Vec<Vec<String>>,
    /// Tier indices whose members may not be adjacent to each other.
    #[serde(default)]
    pub forbidden_within_tiers: Vec<usize>,
}

impl KnowledgeConfigV1 {
    #[must_use]
    pub fn to_knowledge(&self) -> Knowledge {
        let mut k = Knowledge::new();
        for (a, b) in &self.forbidden {
            k.set_forbidden(a, b);
        }
        for (a, b) in &self.required {
            k.set_required(a, b);
        }
        for (tier, members) in self.tiers.iter().enumerate() {
            for name in members {
                k.add_to_tier(tier, name);
            }
        }
        for &tier in &self.forbidden_within_tiers {
            k.set_tier_forbidden_within(tier, true);
        }
        k
    }
}

fn default_penalty() -> f64 {
    1.0
}

fn default_depth() -> usize {
    SearchPolicyV1::default().t_subset_depth
}

fn default_protect() -> bool {
    SearchPolicyV1::default().protect_required_edges
}

/// Harness run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GesConfigV1 {
    #[serde(default = "default_penalty")]
    pub penalty_discount: f64,
    #[serde(default)]
    pub structure_prior: f64,
    #[serde(default)]
    pub max_patterns_to_store: usize,
    #[serde(default = "default_depth")]
    pub t_subset_depth: usize,
    #[serde(default = "default_protect")]
    pub protect_required_edges: bool,
    #[serde(default)]
    pub knowledge: KnowledgeConfigV1,
}

impl Default for GesConfigV1 {
    fn default() -> Self {
        Self {
            penalty_discount: default_penalty(),
            structure_prior: 0.0,
            max_patterns_to_store: 0,
            t_subset_depth: default_depth(),
            protect_required_edges: default_protect(),
            knowledge: KnowledgeConfigV1::default(),
        }
    }
}

impl GesConfigV1 {
    /// Parse and validate a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, unknown fields or
    /// negative counts, and the validation errors of
    /// [`GesConfigV1::validate`].
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(bytes).map_err(|e| ConfigError::Parse {
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Rejects a negative or non-finite penalty or structure prior and an
    /// oversized `t_subset_depth`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.penalty_discount.is_finite() || self.penalty_discount < 0.0 {
            return Err(ConfigError::InvalidPenalty {
                value: self.penalty_discount,
            });
        }
        if !self.structure_prior.is_finite() || self.structure_prior < 0.0 {
            return Err(ConfigError::InvalidStructurePrior {
                value: self.structure_prior,
            });
        }
        if self.t_subset_depth > MAX_T_SUBSET_DEPTH {
            return Err(ConfigError::InvalidDepth {
                value: self.t_subset_depth,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn policy(&self) -> SearchPolicyV1 {
        SearchPolicyV1 {
            max_patterns_to_store: self.max_patterns_to_store,
            t_subset_depth: self.t_subset_depth,
            protect_required_edges: self.protect_required_edges,
        }
    }

    #[must_use]
    pub fn knowledge(&self) -> Knowledge {
        self.knowledge.to_knowledge()
    }

    /// Canonical projection. Floats go through [`f64_value`]; knowledge is
    /// normalized (sorted, deduplicated).
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "knowledge": self.knowledge().to_json_value(),
            "max_patterns_to_store": self.max_patterns_to_store,
            "penalty_discount": f64_value(self.penalty_discount),
            "protect_required_edges": self.protect_required_edges,
            "schema_version": "ges_config.v1",
            "structure_prior": f64_value(self.structure_prior),
            "t_subset_depth": self.t_subset_depth,
        })
    }

    /// # Errors
    ///
    /// Propagates [`CanonError`].
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(canonical_json_bytes(&self.to_json_value())?)
    }

    /// # Errors
    ///
    /// Propagates [`CanonError`].
    pub fn digest(&self) -> Result<ContentHash, ConfigError> {
        Ok(canonical_hash(
            HashDomain::RunConfig,
            &self.to_canonical_json_bytes()?,
        ))
    }
}
