//! Hooks for watching a search as it runs.
//!
//! The engine calls these synchronously; they cannot influence the search.

use ges_kernel::graph::GraphStore;

use crate::arrow::Arrow;
use crate::trace::{PhaseV1, StepEventV1};

pub trait SearchObserver {
    /// An arrow entered the index.
    fn arrow_pushed(&mut self, _phase: PhaseV1, _arrow: &Arrow) {}

    /// An arrow was popped from the index for validation.
    fn arrow_scanned(&mut self, _phase: PhaseV1, _arrow: &Arrow) {}

    /// A step was applied; `graph` is the rebuilt pattern after it.
    fn step_accepted(&mut self, _step: &StepEventV1, _graph: &GraphStore) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}
