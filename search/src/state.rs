//! Mutable state shared by the forward and backward phases.

use ges_kernel::graph::GraphStore;
use ges_kernel::knowledge::ResolvedKnowledge;
use tracing::{debug, warn};

use crate::arrow::Arrow;
use crate::cancel::CancelToken;
use crate::error::SearchError;
use crate::policy::SearchPolicyV1;
use crate::score::ScoreCache;
use crate::top_patterns::TopPatterns;
use crate::trace::{PhaseStatsV1, PhaseV1, SearchTraceV1, StepEventV1};

/// Everything one search invocation owns or borrows.
pub(crate) struct SearchState<'a> {
    pub graph: GraphStore,
    pub cache: ScoreCache<'a>,
    pub knowledge: &'a ResolvedKnowledge,
    pub restriction: Option<&'a GraphStore>,
    pub true_graph: Option<&'a GraphStore>,
    pub policy: &'a SearchPolicyV1,
    pub cancel: Option<&'a CancelToken>,
    pub score: f64,
    pub steps: Vec<StepEventV1>,
    pub top: TopPatterns,
}

/// How a phase ended.
pub(crate) struct PhaseOutcome {
    pub stats: PhaseStatsV1,
    pub cancelled: bool,
}

impl SearchState<'_> {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }

    /// Fail if `arrow` must not be applied because its bump is not positive.
    pub fn check_bump(&self, arrow: &Arrow) -> Result<(), SearchError> {
        if arrow.bump > 0.0 {
            return Ok(());
        }
        let vars = self.graph.variables();
        Err(SearchError::NonPositiveBump {
            x: vars.name(arrow.x).to_string(),
            y: vars.name(arrow.y).to_string(),
            bump: arrow.bump,
        })
    }

    /// Move the running score past an applied arrow. Call after the pattern
    /// has been rebuilt.
    ///
    /// Without knowledge the rebuilt pattern is the operator's result class
    /// and the score moves by exactly `bump`. Knowledge can orient edges of
    /// the rebuilt pattern into a different class, so with knowledge the
    /// score is read back from the pattern's DAG extension instead.
    pub fn advance_score(&mut self, bump: f64) {
        if self.knowledge.is_empty() {
            self.score += bump;
            return;
        }
        match self.cache.score_pattern(&self.graph) {
            Ok(Some(score)) => self.score = score,
            Ok(None) | Err(_) => {
                warn!(bump, "rebuilt pattern not scorable; advancing by bump");
                self.score += bump;
            }
        }
    }

    /// Record an applied arrow. Call after [`Self::advance_score`].
    pub fn record_step(&mut self, phase: PhaseV1, arrow: &Arrow, score_before: f64) -> StepEventV1 {
        let step = StepEventV1 {
            index: self.steps.len() as u64,
            phase,
            x: arrow.x,
            y: arrow.y,
            subset: arrow.subset.clone(),
            na_yx: arrow.na_yx.clone(),
            bump: arrow.bump,
            score_before,
            score_after: self.score,
            edge_count: self.graph.edge_count() as u64,
            in_true_graph: self.true_graph.map(|g| g.is_adjacent(arrow.x, arrow.y)),
        };
        debug!(
            step = %SearchTraceV1::describe_step(self.graph.variables(), &step),
            score = self.score,
            edges = self.graph.edge_count(),
            "step accepted"
        );
        self.steps.push(step.clone());
        self.top.offer(self.score, &self.graph);
        step
    }
}
