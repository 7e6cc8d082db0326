//! Bundle integrity across crates: directory round trip, digest scope and
//! the semantic bindings between config, trace and pattern.

use ges_harness::bundle::{
    verify_bundle, BundleVerifyError, CONFIG_ARTIFACT, PATTERN_ARTIFACT, TOP_PATTERNS_ARTIFACT,
    TRACE_ARTIFACT,
};
use ges_harness::bundle_dir::{read_bundle_dir, write_bundle_dir};
use ges_harness::config::GesConfigV1;
use ges_harness::runner::{run_ges, RunOutput};
use ges_kernel::proof::canon::f64_value;
use lock_tests::bundle_test_helpers::{rebuild_with_modified_artifact, rebuild_without_artifact};
use lock_tests::fixtures::{covariance_of, diamond_sem};

fn diamond_run(max_patterns_to_store: usize) -> RunOutput {
    let config = GesConfigV1 {
        max_patterns_to_store,
        ..GesConfigV1::default()
    };
    run_ges(&covariance_of(&diamond_sem()), &config).unwrap()
}

// ---------------------------------------------------------------------------
// Directory persistence
// ---------------------------------------------------------------------------

#[test]
fn bundle_dir_round_trip_preserves_digest() {
    let out = diamond_run(3);
    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&out.bundle, dir.path()).unwrap();

    let stored = std::fs::read_to_string(dir.path().join("digest.txt")).unwrap();
    assert_eq!(stored.trim(), out.bundle.digest.as_str());

    let loaded = read_bundle_dir(dir.path()).unwrap();
    assert_eq!(loaded.digest, out.bundle.digest);
    assert_eq!(loaded.artifacts, out.bundle.artifacts);
}

#[test]
fn two_writes_of_one_bundle_are_byte_identical() {
    let out = diamond_run(0);
    let (a, b) = (tempfile::tempdir().unwrap(), tempfile::tempdir().unwrap());
    write_bundle_dir(&out.bundle, a.path()).unwrap();
    write_bundle_dir(&out.bundle, b.path()).unwrap();

    let mut names: Vec<_> = std::fs::read_dir(a.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    names.sort();
    assert_eq!(names.len(), 7);
    for name in names {
        assert_eq!(
            std::fs::read(a.path().join(&name)).unwrap(),
            std::fs::read(b.path().join(&name)).unwrap(),
            "{name:?} differs"
        );
    }
}

// ---------------------------------------------------------------------------
// Digest scope
// ---------------------------------------------------------------------------

#[test]
fn digest_basis_lists_only_normative_artifacts() {
    let out = diamond_run(3);
    let basis: serde_json::Value = serde_json::from_slice(&out.bundle.digest_basis).unwrap();
    let names: Vec<&str> = basis["artifacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec![CONFIG_ARTIFACT, PATTERN_ARTIFACT, TRACE_ARTIFACT]);
    assert!(!out.bundle.artifacts[TOP_PATTERNS_ARTIFACT].normative);
}

#[test]
fn observational_artifact_does_not_move_the_digest() {
    let out = diamond_run(3);
    let edited = rebuild_with_modified_artifact(&out.bundle, TOP_PATTERNS_ARTIFACT, |v| {
        v["patterns"] = serde_json::json!([]);
    });
    verify_bundle(&edited).unwrap();
    assert_eq!(edited.digest, out.bundle.digest);
    assert_ne!(edited.manifest, out.bundle.manifest);
}

// ---------------------------------------------------------------------------
// Semantic bindings
// ---------------------------------------------------------------------------

#[test]
fn config_policy_edit_breaks_policy_binding() {
    let out = diamond_run(0);
    let edited = rebuild_with_modified_artifact(&out.bundle, CONFIG_ARTIFACT, |v| {
        v["t_subset_depth"] = serde_json::json!(3);
    });
    assert!(matches!(
        verify_bundle(&edited),
        Err(BundleVerifyError::PolicyDigestMismatch { .. })
    ));
}

#[test]
fn pattern_score_edit_breaks_score_binding() {
    let out = diamond_run(0);
    let edited = rebuild_with_modified_artifact(&out.bundle, PATTERN_ARTIFACT, |v| {
        v["score"] = f64_value(out.result.score + 1.0);
    });
    assert!(matches!(
        verify_bundle(&edited),
        Err(BundleVerifyError::ScoreMismatch { .. })
    ));
}

#[test]
fn pattern_variable_edit_breaks_variable_binding() {
    let out = diamond_run(0);
    let edited = rebuild_with_modified_artifact(&out.bundle, PATTERN_ARTIFACT, |v| {
        v["pattern"]["variables"] = serde_json::json!(["A", "B", "C", "Q"]);
    });
    assert_eq!(
        verify_bundle(&edited),
        Err(BundleVerifyError::VariableMismatch)
    );
}

#[test]
fn bundle_without_trace_fails() {
    let out = diamond_run(0);
    let edited = rebuild_without_artifact(&out.bundle, TRACE_ARTIFACT);
    assert_eq!(
        verify_bundle(&edited),
        Err(BundleVerifyError::ArtifactMissing {
            name: TRACE_ARTIFACT
        })
    );
}
