//! Typed search errors.
//!
//! `SearchError` covers pre-flight failures and fatal invariant breaches.
//! Runtime outcomes that are not errors (invalid or stale arrows, degenerate
//! scores, cancellation) are counted in [`crate::trace::SearchTraceV1`].

use ges_kernel::graph::GraphError;
use ges_kernel::knowledge::KnowledgeError;
use ges_kernel::proof::canon::CanonError;

/// Typed failure for search validation and execution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// A policy field is out of range.
    #[error("invalid search policy: {detail}")]
    InvalidPolicy { detail: String },

    /// An input is defined over a different variable set than the search.
    #[error("{input} is defined over a different variable set")]
    VariableMismatch { input: &'static str },

    /// Knowledge could not be resolved against the variables.
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    /// The initial graph is malformed or has no DAG extension.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The initial graph contains a directed cycle.
    #[error("initial graph contains a directed cycle")]
    CyclicInitialGraph,

    /// The scorer could not score the initial graph.
    #[error("initial graph is not scorable: {detail}")]
    UnscorableInitialGraph { detail: String },

    /// A trace or policy snapshot could not be canonicalized.
    #[error(transparent)]
    Serialization(#[from] CanonError),

    /// An arrow with a non-positive bump reached the apply step. This
    /// breaks the termination argument and aborts the search.
    #[error("non-positive bump {bump} accepted for {x} -> {y}")]
    NonPositiveBump { x: String, y: String, bump: f64 },
}
