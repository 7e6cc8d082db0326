//! Artifact bundle: the serialized result of one GES run, held in memory.
//!
//! A bundle maps artifact names to bytes. Two canonical JSON listings are
//! derived from it: the manifest lists every artifact with its hash and
//! `normative` flag, and the digest basis lists the normative ones only.
//! The bundle digest hashes the digest basis, so observational artifacts
//! can change without moving it.
//!
//! | Artifact | Normative |
//! |---|---|
//! | `config.json` | yes |
//! | `pattern.json` | yes |
//! | `search_trace.json` | yes |
//! | `top_patterns.json` | no |
//!
//! `top_patterns.json` depends on the configured store size, which never
//! changes the steps taken.
//!
//! Persistence lives in [`crate::bundle_dir`].

use std::collections::BTreeMap;

use ges_kernel::proof::canon::{canonical_json_bytes, f64_from_value};
use ges_kernel::proof::hash::{canonical_hash, ContentHash};
use ges_kernel::proof::hash_domain::HashDomain;

pub const CONFIG_ARTIFACT: &str = "config.json";
pub const PATTERN_ARTIFACT: &str = "pattern.json";
pub const TRACE_ARTIFACT: &str = "search_trace.json";
pub const TOP_PATTERNS_ARTIFACT: &str = "top_patterns.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    pub name: String,
    pub content: Vec<u8>,
    /// Hash of `content` under [`HashDomain::BundleArtifact`].
    pub content_hash: ContentHash,
    pub normative: bool,
}

impl BundleArtifact {
    fn new(name: String, content: Vec<u8>, normative: bool) -> Self {
        Self {
            content_hash: canonical_hash(HashDomain::BundleArtifact, &content),
            name,
            content,
            normative,
        }
    }

    fn is_json(&self) -> bool {
        std::path::Path::new(&self.name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactBundleV1 {
    /// Keyed by artifact name.
    pub artifacts: BTreeMap<String, BundleArtifact>,
    pub manifest: Vec<u8>,
    pub digest_basis: Vec<u8>,
    /// Hash of `digest_basis` under [`HashDomain::BundleDigest`].
    pub digest: ContentHash,
}

impl ArtifactBundleV1 {
    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&BundleArtifact> {
        self.artifacts.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleBuildError {
    #[error("canonical JSON error: {0}")]
    Canon(#[from] ges_kernel::proof::canon::CanonError),

    #[error("duplicate artifact name {name}")]
    DuplicateArtifact { name: String },
}

/// Assemble a bundle from `(name, content, normative)` entries.
///
/// # Errors
///
/// A name given twice is [`BundleBuildError::DuplicateArtifact`]; canonical
/// serialization failures pass through.
pub fn build_bundle(
    entries: Vec<(String, Vec<u8>, bool)>,
) -> Result<ArtifactBundleV1, BundleBuildError> {
    let mut artifacts = BTreeMap::new();
    for (name, content, normative) in entries {
        if artifacts.contains_key(&name) {
            return Err(BundleBuildError::DuplicateArtifact { name });
        }
        artifacts.insert(name.clone(), BundleArtifact::new(name, content, normative));
    }

    let manifest = listing_bytes(&artifacts, Listing::Manifest)?;
    let digest_basis = listing_bytes(&artifacts, Listing::DigestBasis)?;
    let digest = canonical_hash(HashDomain::BundleDigest, &digest_basis);
    Ok(ArtifactBundleV1 {
        artifacts,
        manifest,
        digest_basis,
        digest,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleVerifyError {
    #[error("content hash mismatch for {artifact}: expected {expected}, got {actual}")]
    ContentHashMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("manifest does not match artifacts")]
    ManifestMismatch,

    #[error("manifest is not canonical JSON")]
    ManifestNotCanonical,

    #[error("digest basis does not match normative artifacts")]
    DigestBasisMismatch,

    #[error("digest basis is not canonical JSON")]
    DigestBasisNotCanonical,

    #[error("bundle digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("normative artifact {artifact} is not canonical JSON")]
    ArtifactNotCanonical { artifact: String },

    #[error("required artifact {name} is missing")]
    ArtifactMissing { name: &'static str },

    #[error("artifact {artifact} is malformed: {detail}")]
    ArtifactMalformed {
        artifact: &'static str,
        detail: String,
    },

    /// The trace's `policy_digest` does not match the policy in `config.json`.
    #[error("policy digest mismatch: trace declares {declared}, config gives {recomputed}")]
    PolicyDigestMismatch {
        declared: String,
        recomputed: String,
    },

    #[error("pattern and trace are over different variables")]
    VariableMismatch,

    /// `pattern.json` score bits differ from the trace's final score.
    #[error("pattern score {in_pattern} differs from trace final score {in_trace}")]
    ScoreMismatch { in_pattern: String, in_trace: String },

    #[error("canonical JSON error: {detail}")]
    Canon { detail: String },
}

/// Check a bundle's integrity without rerunning the search.
///
/// Hashes, both listings and the digest are recomputed; normative JSON must
/// be canonical; the trace's `policy_digest` must match the policy fields
/// of `config.json`; `pattern.json` must agree with the trace on variables
/// and final-score bits.
///
/// # Errors
///
/// Returns the first [`BundleVerifyError`] found, in that order.
pub fn verify_bundle(bundle: &ArtifactBundleV1) -> Result<(), BundleVerifyError> {
    if let Some((artifact, actual)) = bundle.artifacts.values().find_map(|a| {
        let actual = canonical_hash(HashDomain::BundleArtifact, &a.content);
        (actual != a.content_hash).then_some((a, actual))
    }) {
        return Err(BundleVerifyError::ContentHashMismatch {
            artifact: artifact.name.clone(),
            expected: artifact.content_hash.as_str().to_string(),
            actual: actual.as_str().to_string(),
        });
    }

    let relist = |listing| {
        listing_bytes(&bundle.artifacts, listing).map_err(|e| BundleVerifyError::Canon {
            detail: e.to_string(),
        })
    };
    if relist(Listing::Manifest)? != bundle.manifest {
        return Err(BundleVerifyError::ManifestMismatch);
    }
    if !is_canonical_json(&bundle.manifest) {
        return Err(BundleVerifyError::ManifestNotCanonical);
    }
    if relist(Listing::DigestBasis)? != bundle.digest_basis {
        return Err(BundleVerifyError::DigestBasisMismatch);
    }
    if !is_canonical_json(&bundle.digest_basis) {
        return Err(BundleVerifyError::DigestBasisNotCanonical);
    }

    let digest = canonical_hash(HashDomain::BundleDigest, &bundle.digest_basis);
    if digest != bundle.digest {
        return Err(BundleVerifyError::DigestMismatch {
            expected: bundle.digest.as_str().to_string(),
            actual: digest.as_str().to_string(),
        });
    }

    if let Some(a) = bundle
        .artifacts
        .values()
        .find(|a| a.normative && a.is_json() && !is_canonical_json(&a.content))
    {
        return Err(BundleVerifyError::ArtifactNotCanonical {
            artifact: a.name.clone(),
        });
    }

    let trace = parse_artifact(bundle, TRACE_ARTIFACT)?;
    verify_policy_binding(bundle, &trace)?;
    verify_pattern_binding(bundle, &trace)
}

#[derive(Clone, Copy)]
enum Listing {
    /// Every artifact, with its `normative` flag.
    Manifest,
    /// Normative artifacts only.
    DigestBasis,
}

fn listing_bytes(
    artifacts: &BTreeMap<String, BundleArtifact>,
    listing: Listing,
) -> Result<Vec<u8>, BundleBuildError> {
    let entries: Vec<serde_json::Value> = artifacts
        .values()
        .filter_map(|a| match listing {
            Listing::Manifest => Some(serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
                "normative": a.normative,
            })),
            Listing::DigestBasis => a.normative.then(|| {
                serde_json::json!({
                    "content_hash": a.content_hash.as_str(),
                    "name": a.name,
                })
            }),
        })
        .collect();
    let schema_version = match listing {
        Listing::Manifest => "bundle.v1",
        Listing::DigestBasis => "bundle_digest_basis.v1",
    };
    Ok(canonical_json_bytes(&serde_json::json!({
        "artifacts": entries,
        "schema_version": schema_version,
    }))?)
}

/// True when `bytes` parse as JSON and re-serialize to themselves.
fn is_canonical_json(bytes: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .ok()
        .and_then(|v| canonical_json_bytes(&v).ok())
        .is_some_and(|c| c == bytes)
}

fn parse_artifact(
    bundle: &ArtifactBundleV1,
    name: &'static str,
) -> Result<serde_json::Value, BundleVerifyError> {
    let artifact = bundle
        .artifact(name)
        .ok_or(BundleVerifyError::ArtifactMissing { name })?;
    serde_json::from_slice(&artifact.content).map_err(|e| BundleVerifyError::ArtifactMalformed {
        artifact: name,
        detail: e.to_string(),
    })
}

fn verify_policy_binding(
    bundle: &ArtifactBundleV1,
    trace: &serde_json::Value,
) -> Result<(), BundleVerifyError> {
    let config_value = parse_artifact(bundle, CONFIG_ARTIFACT)?;
    let malformed = |detail: String| BundleVerifyError::ArtifactMalformed {
        artifact: CONFIG_ARTIFACT,
        detail,
    };
    let field_u64 = |key: &str| {
        config_value[key]
            .as_u64()
            .ok_or_else(|| malformed(format!("missing {key}")))
    };
    let policy = ges_search::SearchPolicyV1 {
        max_patterns_to_store: usize::try_from(field_u64("max_patterns_to_store")?)
            .map_err(|e| malformed(e.to_string()))?,
        t_subset_depth: usize::try_from(field_u64("t_subset_depth")?)
            .map_err(|e| malformed(e.to_string()))?,
        protect_required_edges: config_value["protect_required_edges"]
            .as_bool()
            .ok_or_else(|| malformed("missing protect_required_edges".into()))?,
    };
    let recomputed = policy.digest().map_err(|e| BundleVerifyError::Canon {
        detail: e.to_string(),
    })?;

    let declared = trace["policy_digest"].as_str().ok_or_else(|| {
        BundleVerifyError::ArtifactMalformed {
            artifact: TRACE_ARTIFACT,
            detail: "missing policy_digest".into(),
        }
    })?;
    if declared != recomputed.as_str() {
        return Err(BundleVerifyError::PolicyDigestMismatch {
            declared: declared.to_string(),
            recomputed: recomputed.as_str().to_string(),
        });
    }
    Ok(())
}

fn verify_pattern_binding(
    bundle: &ArtifactBundleV1,
    trace: &serde_json::Value,
) -> Result<(), BundleVerifyError> {
    let pattern = parse_artifact(bundle, PATTERN_ARTIFACT)?;
    if pattern["pattern"]["variables"] != trace["variables"] {
        return Err(BundleVerifyError::VariableMismatch);
    }
    let in_pattern = f64_from_value(&pattern["score"]);
    let in_trace = f64_from_value(&trace["final_score"]);
    match (in_pattern, in_trace) {
        (Some(a), Some(b)) if a.to_bits() == b.to_bits() => Ok(()),
        _ => Err(BundleVerifyError::ScoreMismatch {
            in_pattern: pattern["score"]["bits"].to_string(),
            in_trace: trace["final_score"]["bits"].to_string(),
        }),
    }
}
