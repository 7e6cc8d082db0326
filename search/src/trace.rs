//! Search trace: the auditable record of one search.
//!
//! The trace lists every accepted step in order together with per-phase
//! counters. It is a normative artifact: two runs on the same inputs must
//! produce byte-identical canonical JSON.

use ges_kernel::graph::{VarId, VariableSet};
use ges_kernel::proof::canon::{canonical_json_bytes, f64_value, CanonError};
use ges_kernel::proof::hash::{canonical_hash, ContentHash};
use ges_kernel::proof::hash_domain::HashDomain;

/// Search phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PhaseV1 {
    Forward,
    Backward,
}

impl PhaseV1 {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

/// One accepted Insert (forward) or Delete (backward).
#[derive(Debug, Clone, PartialEq)]
pub struct StepEventV1 {
    /// Position in the overall step sequence, from 0.
    pub index: u64,
    pub phase: PhaseV1,
    pub x: VarId,
    pub y: VarId,
    /// `T` for an insert, `H` for a delete.
    pub subset: Vec<VarId>,
    pub na_yx: Vec<VarId>,
    /// The operator's own score change, always positive.
    pub bump: f64,
    pub score_before: f64,
    /// Total score of the rebuilt pattern. Equals `score_before + bump`
    /// unless knowledge reoriented the rebuilt pattern.
    pub score_after: f64,
    /// Edge count of the pattern after the step.
    pub edge_count: u64,
    /// Whether `x` and `y` are adjacent in the diagnostic true graph.
    pub in_true_graph: Option<bool>,
}

/// Counters for one phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseStatsV1 {
    pub arrows_pushed: u64,
    pub arrows_scanned: u64,
    pub arrows_invalid: u64,
    pub arrows_stale: u64,
    pub apply_failures: u64,
    pub candidates_degenerate: u64,
    pub cells_evaluated: u64,
    pub steps_accepted: u64,
    pub index_high_water: u64,
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReasonV1 {
    /// Both phases ran until no valid positive-bump arrow remained.
    Converged,
    /// The cancel token was set during `phase`.
    Cancelled { phase: PhaseV1 },
}

/// Complete record of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTraceV1 {
    pub variables: Vec<String>,
    pub policy_digest: String,
    pub initial_score: f64,
    pub final_score: f64,
    /// Total score of the final pattern recomputed from scratch.
    pub recomputed_score: Option<f64>,
    pub initial_edge_count: u64,
    pub required_edges_added: u64,
    pub steps: Vec<StepEventV1>,
    pub forward: PhaseStatsV1,
    pub backward: PhaseStatsV1,
    pub score_evaluations: u64,
    pub score_cache_hits: u64,
    pub termination_reason: TerminationReasonV1,
}

impl SearchTraceV1 {
    /// Steps of one phase, in order.
    pub fn steps_in(&self, phase: PhaseV1) -> impl Iterator<Item = &StepEventV1> {
        self.steps.iter().filter(move |s| s.phase == phase)
    }

    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.termination_reason == TerminationReasonV1::Converged
    }

    /// Serialize to canonical JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// Content hash of the canonical trace.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        Ok(canonical_hash(
            HashDomain::SearchTrace,
            &self.to_canonical_json_bytes()?,
        ))
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let names = |ids: &[VarId]| -> Vec<&str> {
            ids.iter()
                .map(|v| self.variables.get(v.index()).map_or("?", String::as_str))
                .collect()
        };
        let name = |v: VarId| self.variables.get(v.index()).map_or("?", String::as_str);

        let steps: Vec<serde_json::Value> = self
            .steps
            .iter()
            .map(|s| {
                serde_json::json!({
                    "bump": f64_value(s.bump),
                    "edge_count": s.edge_count,
                    "in_true_graph": s.in_true_graph,
                    "index": s.index,
                    "na_yx": names(&s.na_yx),
                    "phase": s.phase.as_str(),
                    "score_after": f64_value(s.score_after),
                    "score_before": f64_value(s.score_before),
                    "subset": names(&s.subset),
                    "x": name(s.x),
                    "y": name(s.y),
                })
            })
            .collect();

        serde_json::json!({
            "backward": stats_to_json(&self.backward),
            "final_score": f64_value(self.final_score),
            "forward": stats_to_json(&self.forward),
            "initial_edge_count": self.initial_edge_count,
            "initial_score": f64_value(self.initial_score),
            "policy_digest": self.policy_digest,
            "recomputed_score": self.recomputed_score.map(f64_value),
            "required_edges_added": self.required_edges_added,
            "schema_version": "search_trace.v1",
            "score_cache_hits": self.score_cache_hits,
            "score_evaluations": self.score_evaluations,
            "steps": steps,
            "termination_reason": termination_to_json(self.termination_reason),
            "variables": self.variables,
        })
    }

    /// Render one step for logs, e.g. `INSERT X --> Y [Z] bump=1.25`.
    #[must_use]
    pub fn describe_step(variables: &VariableSet, step: &StepEventV1) -> String {
        let op = match step.phase {
            PhaseV1::Forward => "INSERT",
            PhaseV1::Backward => "DELETE",
        };
        let marker = if step.in_true_graph == Some(false) { "*" } else { "" };
        format!(
            "{op} {}{marker} {} --> {} {} bump={:.4}",
            step.index,
            variables.name(step.x),
            variables.name(step.y),
            variables.render(&step.subset),
            step.bump
        )
    }
}

fn stats_to_json(s: &PhaseStatsV1) -> serde_json::Value {
    serde_json::json!({
        "apply_failures": s.apply_failures,
        "arrows_invalid": s.arrows_invalid,
        "arrows_pushed": s.arrows_pushed,
        "arrows_scanned": s.arrows_scanned,
        "arrows_stale": s.arrows_stale,
        "candidates_degenerate": s.candidates_degenerate,
        "cells_evaluated": s.cells_evaluated,
        "index_high_water": s.index_high_water,
        "steps_accepted": s.steps_accepted,
    })
}

fn termination_to_json(r: TerminationReasonV1) -> serde_json::Value {
    match r {
        TerminationReasonV1::Converged => serde_json::json!({"type": "converged"}),
        TerminationReasonV1::Cancelled { phase } => {
            serde_json::json!({"phase": phase.as_str(), "type": "cancelled"})
        }
    }
}
