//! Helpers for mutating and rebuilding artifact bundles.
//!
//! Rebuilding recomputes every content hash, the manifest and the digest,
//! so a negative test exercises the semantic check it targets instead of
//! tripping over a hash mismatch first.

use ges_harness::bundle::{build_bundle, ArtifactBundleV1};
use ges_kernel::proof::canon::canonical_json_bytes;

/// Rewrite one JSON artifact and rebuild the bundle around it.
///
/// # Panics
///
/// Panics if `name` is missing or not JSON. These are test-only invariants.
pub fn rebuild_with_modified_artifact(
    bundle: &ArtifactBundleV1,
    name: &str,
    modify: impl FnOnce(&mut serde_json::Value),
) -> ArtifactBundleV1 {
    let artifact = bundle.artifacts.get(name).unwrap();
    let mut value: serde_json::Value = serde_json::from_slice(&artifact.content).unwrap();
    modify(&mut value);
    let modified = canonical_json_bytes(&value).unwrap();

    let artifacts: Vec<(String, Vec<u8>, bool)> = bundle
        .artifacts
        .values()
        .map(|a| {
            let content = if a.name == name {
                modified.clone()
            } else {
                a.content.clone()
            };
            (a.name.clone(), content, a.normative)
        })
        .collect();
    build_bundle(artifacts).unwrap()
}

/// Rebuild the bundle without the named artifact.
///
/// # Panics
///
/// Panics if the remaining artifacts fail to build.
pub fn rebuild_without_artifact(bundle: &ArtifactBundleV1, name: &str) -> ArtifactBundleV1 {
    let artifacts: Vec<(String, Vec<u8>, bool)> = bundle
        .artifacts
        .values()
        .filter(|a| a.name != name)
        .map(|a| (a.name.clone(), a.content.clone(), a.normative))
        .collect();
    build_bundle(artifacts).unwrap()
}
