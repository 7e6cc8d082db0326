//! GES Search: greedy equivalence search over a decomposable local score.
//!
//! This crate owns the engine. It depends only on `ges_kernel`; it does NOT
//! depend on `ges_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! ges_kernel  ←  ges_search  ←  ges_harness
//! (graphs,        (arrows,        (scores, config,
//!  operators)      phases)         bundles, runner)
//! ```
//!
//! # Key types
//!
//! - [`LocalScore`]: the scoring contract; [`ScoreCache`] memoizes it per search
//! - [`Arrow`] / [`ArrowIndex`]: scored candidate operators, best first
//! - [`SearchPolicyV1`]: T-subset depth, top-K size, required-edge protection
//! - [`SearchTraceV1`]: ordered steps and per-phase counters (normative artifact)
//! - [`search`]: forward phase, then backward phase, returning a pattern

#![forbid(unsafe_code)]

pub mod arrow;
pub mod arrow_index;
mod backward;
pub mod cancel;
pub mod error;
mod forward;
pub mod observer;
pub mod policy;
pub mod score;
pub mod search;
mod state;
pub mod subsets;
pub mod top_patterns;
pub mod trace;

pub use arrow::Arrow;
pub use arrow_index::ArrowIndex;
pub use cancel::CancelToken;
pub use error::SearchError;
pub use observer::{NoopObserver, SearchObserver};
pub use policy::SearchPolicyV1;
pub use score::{LocalScore, ScoreCache};
pub use search::{search, search_with_observer, SearchOptions, SearchResult};
pub use top_patterns::{ScoredPattern, TopPatterns};
pub use trace::{PhaseStatsV1, PhaseV1, SearchTraceV1, StepEventV1, TerminationReasonV1};
