//! Proof module: canonical JSON and domain-separated content hashing.
//!
//! Depends on `graph` only for pattern fingerprints. Search traces and
//! artifact bundles in the outer crates hash through here.

pub mod canon;
pub mod hash;
pub mod hash_domain;

use crate::graph::store::GraphStore;
use canon::{canonical_json_bytes, CanonError};
use hash::{canonical_hash, ContentHash};
use hash_domain::HashDomain;

/// Content hash of a graph's variables and edges.
///
/// Two graphs over the same variable names have equal fingerprints iff
/// they have the same edges with the same marks.
///
/// # Errors
///
/// Propagates [`CanonError`]; the graph projection holds no numbers, so this
/// does not fail in practice.
pub fn graph_fingerprint(graph: &GraphStore) -> Result<ContentHash, CanonError> {
    let bytes = canonical_json_bytes(&graph.to_json_value())?;
    Ok(canonical_hash(HashDomain::Pattern, &bytes))
}
