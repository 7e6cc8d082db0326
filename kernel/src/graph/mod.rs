//! Graph module: variables, edges, the mutable `GraphStore`, and DAG utilities.
//!
//! This is the foundational layer. No other kernel module is imported here.

pub mod dag;
pub mod edge;
pub mod store;
pub mod variable;

pub use edge::{Edge, Endpoint};
pub use store::GraphStore;
pub use variable::{VarId, VariableSet};

/// Malformed variable sets or graph construction requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },
    #[error("empty variable name at index {index}")]
    EmptyVariableName { index: usize },
    #[error("variable count {count} exceeds the u32 index space")]
    TooManyVariables { count: usize },
    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },
    #[error("self loop on {name}")]
    SelfLoop { name: String },
    #[error("graphs are defined over different variable sets")]
    VariableMismatch,
    #[error("pattern admits no consistent DAG extension")]
    NoConsistentExtension,
}
