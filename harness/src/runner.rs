//! Harness runner: configuration and covariance in, verified bundle out.
//!
//! `run_ges` validates the configuration, builds the Gaussian BIC score,
//! runs the search, serializes the result into an [`ArtifactBundleV1`] and
//! verifies the bundle before returning it.

use ges_kernel::graph::GraphStore;
use ges_kernel::proof::canon::canonical_json_bytes;
use ges_kernel::proof::graph_fingerprint;
use ges_search::{search, CancelToken, ScoredPattern, SearchError, SearchOptions, SearchResult};
use tracing::info;

use crate::bundle::{
    build_bundle, verify_bundle, ArtifactBundleV1, BundleBuildError, BundleVerifyError,
    CONFIG_ARTIFACT, PATTERN_ARTIFACT, TOP_PATTERNS_ARTIFACT, TRACE_ARTIFACT,
};
use crate::config::{ConfigError, GesConfigV1};
use crate::covariance::CovarianceMatrix;
use crate::sem_bic::{ScoreConfigError, SemBicScore};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Score(#[from] ScoreConfigError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("bundle build failed: {0}")]
    BundleBuild(#[from] BundleBuildError),

    #[error("bundle verification failed: {0}")]
    BundleVerify(#[from] BundleVerifyError),
}

/// Optional graph inputs and cancellation for [`run_ges_with_options`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions<'a> {
    pub initial_graph: Option<&'a GraphStore>,
    pub adjacency_restriction: Option<&'a GraphStore>,
    pub true_graph: Option<&'a GraphStore>,
    pub cancel: Option<&'a CancelToken>,
}

/// A search result together with its verified bundle.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub result: SearchResult,
    pub bundle: ArtifactBundleV1,
}

/// Run GES on `covariance` under `config`.
///
/// # Errors
///
/// Returns [`RunError`] if the configuration or score parameters are
/// invalid, the search fails pre-flight, or the bundle fails to build or
/// verify.
pub fn run_ges(covariance: &CovarianceMatrix, config: &GesConfigV1) -> Result<RunOutput, RunError> {
    run_ges_with_options(covariance, config, RunOptions::default())
}

/// [`run_ges`] with an initial graph, adjacency restriction, true graph or
/// cancel token.
///
/// # Errors
///
/// Same as [`run_ges`].
pub fn run_ges_with_options(
    covariance: &CovarianceMatrix,
    config: &GesConfigV1,
    options: RunOptions<'_>,
) -> Result<RunOutput, RunError> {
    config.validate()?;
    let score = SemBicScore::new(covariance.clone(), config.penalty_discount)?
        .with_structure_prior(config.structure_prior)?;
    let knowledge = config.knowledge();
    let policy = config.policy();

    info!(
        variables = covariance.dim(),
        sample_size = covariance.sample_size(),
        penalty_discount = config.penalty_discount,
        "running GES"
    );

    let result = search(
        covariance.variables(),
        &score,
        &policy,
        SearchOptions {
            knowledge: Some(&knowledge),
            initial_graph: options.initial_graph,
            adjacency_restriction: options.adjacency_restriction,
            true_graph: options.true_graph,
            cancel: options.cancel,
        },
    )?;

    let bundle = bundle_result(config, &result)?;
    verify_bundle(&bundle)?;
    info!(
        digest = %bundle.digest,
        edges = result.pattern.edge_count(),
        "bundle verified"
    );
    Ok(RunOutput { result, bundle })
}

fn bundle_result(
    config: &GesConfigV1,
    result: &SearchResult,
) -> Result<ArtifactBundleV1, RunError> {
    let final_pattern = ScoredPattern {
        score: result.score,
        pattern: result.pattern.clone(),
        fingerprint: graph_fingerprint(&result.pattern).map_err(BundleBuildError::from)?,
    };
    let top: Vec<serde_json::Value> = result
        .top_patterns
        .iter()
        .map(ScoredPattern::to_json_value)
        .collect();
    let top_value = serde_json::json!({
        "patterns": top,
        "schema_version": "top_patterns.v1",
    });

    let canon = |v: &serde_json::Value| canonical_json_bytes(v).map_err(BundleBuildError::from);
    let artifacts = vec![
        (
            CONFIG_ARTIFACT.to_string(),
            config.to_canonical_json_bytes()?,
            true,
        ),
        (
            PATTERN_ARTIFACT.to_string(),
            canon(&final_pattern.to_json_value())?,
            true,
        ),
        (
            TRACE_ARTIFACT.to_string(),
            result
                .trace
                .to_canonical_json_bytes()
                .map_err(BundleBuildError::from)?,
            true,
        ),
        (TOP_PATTERNS_ARTIFACT.to_string(), canon(&top_value)?, false),
    ];
    Ok(build_bundle(artifacts)?)
}
