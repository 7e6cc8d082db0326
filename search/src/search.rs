//! Search entry point: pre-flight validation, forward phase, backward phase.

use std::sync::Arc;

use ges_kernel::graph::dag::has_directed_cycle;
use ges_kernel::graph::{GraphStore, VariableSet};
use ges_kernel::knowledge::{Knowledge, ResolvedKnowledge};
use ges_kernel::pattern::{add_required_edges, rebuild_pattern};
use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::error::SearchError;
use crate::observer::{NoopObserver, SearchObserver};
use crate::policy::SearchPolicyV1;
use crate::score::{LocalScore, ScoreCache};
use crate::state::SearchState;
use crate::top_patterns::{ScoredPattern, TopPatterns};
use crate::trace::{PhaseStatsV1, PhaseV1, SearchTraceV1, TerminationReasonV1};
use crate::{backward, forward};

/// Optional inputs to [`search`]. Every graph must be defined over the same
/// variable names as the search.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions<'a> {
    /// Background knowledge. `None` means unrestricted.
    pub knowledge: Option<&'a Knowledge>,
    /// Starting graph (DAG or pattern). `None` means the empty graph.
    pub initial_graph: Option<&'a GraphStore>,
    /// Only pairs adjacent in this graph are considered for insertion.
    pub adjacency_restriction: Option<&'a GraphStore>,
    /// Diagnostic only: steps record whether they touch a true adjacency.
    pub true_graph: Option<&'a GraphStore>,
    pub cancel: Option<&'a CancelToken>,
}

/// Result of a search.
///
/// A cancelled search still returns its partial pattern; check
/// `trace.termination_reason`.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Final pattern (CPDAG).
    pub pattern: GraphStore,
    /// Running score of `pattern`.
    pub score: f64,
    /// Best patterns seen, best first. Empty unless the policy stores any.
    pub top_patterns: Vec<ScoredPattern>,
    pub trace: SearchTraceV1,
}

impl SearchResult {
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.trace.is_converged()
    }
}

/// Run greedy equivalence search over `variables`.
///
/// # Errors
///
/// Returns [`SearchError`] for pre-flight failures (invalid policy, unknown
/// knowledge variable, variable-set mismatch, cyclic or unscorable initial
/// graph), or [`SearchError::NonPositiveBump`] if an arrow without positive
/// bump reaches the apply step.
pub fn search(
    variables: &Arc<VariableSet>,
    scorer: &dyn LocalScore,
    policy: &SearchPolicyV1,
    options: SearchOptions<'_>,
) -> Result<SearchResult, SearchError> {
    search_with_observer(variables, scorer, policy, options, &mut NoopObserver)
}

/// [`search`] with an observer notified of every arrow and step.
///
/// # Errors
///
/// Same as [`search`].
pub fn search_with_observer<O: SearchObserver + ?Sized>(
    variables: &Arc<VariableSet>,
    scorer: &dyn LocalScore,
    policy: &SearchPolicyV1,
    options: SearchOptions<'_>,
    observer: &mut O,
) -> Result<SearchResult, SearchError> {
    policy.validate()?;
    if scorer.num_vars() != variables.len() {
        return Err(SearchError::VariableMismatch { input: "scorer" });
    }
    let knowledge = match options.knowledge {
        Some(k) => k.resolve(variables)?,
        None => ResolvedKnowledge::unrestricted(variables.len()),
    };
    for (input, graph) in [
        ("initial graph", options.initial_graph),
        ("adjacency restriction", options.adjacency_restriction),
        ("true graph", options.true_graph),
    ] {
        if graph.is_some_and(|g| g.variables().names() != variables.names()) {
            return Err(SearchError::VariableMismatch { input });
        }
    }

    let mut graph = GraphStore::new(Arc::clone(variables));
    if let Some(initial) = options.initial_graph {
        if has_directed_cycle(initial) {
            return Err(SearchError::CyclicInitialGraph);
        }
        for e in initial.edges() {
            graph.add_edge(e);
        }
    }
    let required_edges_added = add_required_edges(&mut graph, &knowledge);
    rebuild_pattern(&mut graph, Some(&knowledge));
    if knowledge.is_violated_by(&graph) {
        warn!("starting pattern violates background knowledge");
    }

    let mut cache = ScoreCache::new(scorer);
    let initial_score = cache
        .score_pattern(&graph)?
        .ok_or_else(|| SearchError::UnscorableInitialGraph {
            detail: "a local score of the initial pattern is undefined".to_string(),
        })?;
    let policy_digest = policy.digest()?;
    let initial_edge_count = graph.edge_count() as u64;

    info!(
        variables = variables.len(),
        score = initial_score,
        edges = initial_edge_count,
        required_edges_added,
        "search starting"
    );

    let mut top = TopPatterns::new(policy.max_patterns_to_store);
    top.offer(initial_score, &graph);

    let mut state = SearchState {
        graph,
        cache,
        knowledge: &knowledge,
        restriction: options.adjacency_restriction,
        true_graph: options.true_graph,
        policy,
        cancel: options.cancel,
        score: initial_score,
        steps: Vec::new(),
        top,
    };

    let fwd = forward::run(&mut state, observer)?;
    let (bwd, termination_reason) = if fwd.cancelled {
        (
            PhaseStatsV1::default(),
            TerminationReasonV1::Cancelled {
                phase: PhaseV1::Forward,
            },
        )
    } else {
        let bwd = backward::run(&mut state, observer)?;
        let reason = if bwd.cancelled {
            TerminationReasonV1::Cancelled {
                phase: PhaseV1::Backward,
            }
        } else {
            TerminationReasonV1::Converged
        };
        (bwd.stats, reason)
    };

    let SearchState {
        graph,
        mut cache,
        score,
        steps,
        top,
        ..
    } = state;
    let recomputed_score = cache.score_pattern(&graph).ok().flatten();
    info!(
        score,
        recomputed = ?recomputed_score,
        edges = graph.edge_count(),
        steps = steps.len(),
        "search finished"
    );

    let trace = SearchTraceV1 {
        variables: variables.names().to_vec(),
        policy_digest: policy_digest.as_str().to_string(),
        initial_score,
        final_score: score,
        recomputed_score,
        initial_edge_count,
        required_edges_added: required_edges_added as u64,
        steps,
        forward: fwd.stats,
        backward: bwd,
        score_evaluations: cache.evaluations(),
        score_cache_hits: cache.hits(),
        termination_reason,
    };

    Ok(SearchResult {
        pattern: graph,
        score,
        top_patterns: top.into_entries(),
        trace,
    })
}
