//! Shared helpers for the GES benchmark suites.
//!
//! A regime is a covariance matrix plus a run configuration. Covariances
//! are implied by linear SEMs over deterministic pseudo-random DAGs, so
//! every machine benchmarks the same search.

use std::sync::Arc;

use ges_harness::config::GesConfigV1;
use ges_harness::covariance::CovarianceMatrix;
use ges_harness::linear_sem::LinearSem;
use ges_harness::sem_bic::SemBicScore;
use ges_kernel::graph::{GraphStore, VarId, VariableSet};
use ges_kernel::knowledge::Knowledge;
use ges_kernel::proof::hash::{canonical_hash, ContentHash};
use ges_kernel::proof::hash_domain::HashDomain;
use ges_search::{search, SearchOptions, SearchPolicyV1, SearchResult};

/// Sample size attached to every regime covariance.
pub const SAMPLE_SIZE: usize = 1000;

/// Deterministic 64-bit LCG (Knuth MMIX constants).
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 11
    }

    /// Uniform in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        // 53 significant bits.
        #[allow(clippy::cast_precision_loss)]
        let x = self.next_u64() as f64;
        x / (1u64 << 53) as f64
    }
}

/// `V0 .. V{n-1}`.
///
/// # Panics
///
/// Panics if `n` does not fit a `u32`.
#[must_use]
pub fn numbered_vars(n: usize) -> Arc<VariableSet> {
    Arc::new(VariableSet::new((0..n).map(|i| format!("V{i}"))).expect("valid names"))
}

/// Random DAG over `V0..V{n-1}` with edges `Vi --> Vj`, `i < j`, each
/// present with probability `density`.
#[must_use]
pub fn random_dag(n: usize, density: f64, seed: u64) -> Vec<(usize, usize)> {
    let mut rng = Lcg::new(seed);
    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.next_unit() < density {
                edges.push((i, j));
            }
        }
    }
    edges
}

/// Linear SEM over the given edges with coefficients in `[0.4, 0.9)`.
///
/// # Panics
///
/// Panics on out-of-range indices.
#[must_use]
pub fn linear_sem(n: usize, edges: &[(usize, usize)], seed: u64) -> LinearSem {
    let mut rng = Lcg::new(seed ^ 0x9e37_79b9_7f4a_7c15);
    edges.iter().fold(LinearSem::new(numbered_vars(n)), |m, &(a, b)| {
        let coef = 0.4 + 0.5 * rng.next_unit();
        m.with_edge(&format!("V{a}"), &format!("V{b}"), coef)
            .expect("valid edge")
    })
}

/// Graph over `V0..V{n-1}` from index edges, all directed.
#[must_use]
pub fn directed_graph(n: usize, edges: &[(usize, usize)]) -> GraphStore {
    let mut g = GraphStore::new(numbered_vars(n));
    for &(a, b) in edges {
        g.add_directed_edge(var(a), var(b));
    }
    g
}

/// # Panics
///
/// Panics if `i` does not fit a `u32`.
#[must_use]
pub fn var(i: usize) -> VarId {
    VarId::new(u32::try_from(i).expect("index fits u32"))
}

/// One benchmark workload.
#[derive(Debug, Clone)]
pub struct Regime {
    pub name: &'static str,
    pub covariance: CovarianceMatrix,
    pub config: GesConfigV1,
}

fn regime(name: &'static str, n: usize, edges: &[(usize, usize)], config: GesConfigV1) -> Regime {
    let covariance = linear_sem(n, edges, n as u64)
        .implied_covariance(SAMPLE_SIZE)
        .expect("acyclic model");
    Regime {
        name,
        covariance,
        config,
    }
}

/// `V0 --> V1 --> ... --> V{n-1}`.
#[must_use]
pub fn regime_chain(n: usize) -> Regime {
    let edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
    regime("chain", n, &edges, GesConfigV1::default())
}

/// Sparse random DAG, about two parents per node.
#[must_use]
pub fn regime_sparse(n: usize) -> Regime {
    let density = (2.0 / n.max(2) as f64).min(1.0);
    regime("sparse", n, &random_dag(n, density, 7), GesConfigV1::default())
}

/// Dense random DAG with a wider `T` subset search.
#[must_use]
pub fn regime_dense(n: usize) -> Regime {
    let config = GesConfigV1 {
        t_subset_depth: 2,
        ..GesConfigV1::default()
    };
    regime("dense", n, &random_dag(n, 0.4, 11), config)
}

/// Sparse DAG with two temporal tiers and a top-pattern store.
#[must_use]
pub fn regime_tiered(n: usize) -> Regime {
    let (early, late): (Vec<usize>, Vec<usize>) = (0..n).partition(|&i| i < n / 2);
    let names = |ids: Vec<usize>| -> Vec<String> {
        ids.into_iter().map(|i| format!("V{i}")).collect()
    };
    let mut config = GesConfigV1 {
        max_patterns_to_store: 5,
        ..GesConfigV1::default()
    };
    config.knowledge.tiers = vec![names(early), names(late)];
    let density = (2.0 / n.max(2) as f64).min(1.0);
    regime("tiered", n, &random_dag(n, density, 13), config)
}

/// The standard regime set for macro benchmarks and reports.
#[must_use]
pub fn standard_regimes() -> Vec<Regime> {
    vec![
        regime_chain(10),
        regime_sparse(15),
        regime_dense(8),
        regime_tiered(12),
    ]
}

/// Score, policy and knowledge built once so a benchmark can time only
/// `search()`.
pub struct EngineSetup {
    pub variables: Arc<VariableSet>,
    pub score: SemBicScore,
    pub policy: SearchPolicyV1,
    pub knowledge: Knowledge,
}

/// # Panics
///
/// Panics if the regime configuration is invalid.
#[must_use]
pub fn prepare_engine(regime: &Regime) -> EngineSetup {
    let score = SemBicScore::new(regime.covariance.clone(), regime.config.penalty_discount)
        .and_then(|s| s.with_structure_prior(regime.config.structure_prior))
        .expect("valid score parameters");
    EngineSetup {
        variables: Arc::clone(regime.covariance.variables()),
        score,
        policy: regime.config.policy(),
        knowledge: regime.config.knowledge(),
    }
}

/// Run `search()` with a prepared setup.
///
/// # Panics
///
/// Panics if the search fails pre-flight. Benchmark runs are expected to
/// succeed.
#[must_use]
pub fn run_engine_only(setup: &EngineSetup) -> SearchResult {
    search(
        &setup.variables,
        &setup.score,
        &setup.policy,
        SearchOptions {
            knowledge: Some(&setup.knowledge),
            ..SearchOptions::default()
        },
    )
    .expect("search should succeed in benchmarks")
}

/// Determinism guard: hash of the canonical trace. Every iteration of a
/// regime must produce the same guard.
///
/// # Panics
///
/// Panics if the trace cannot be canonicalized.
#[must_use]
pub fn guard_digest(result: &SearchResult) -> ContentHash {
    let bytes = result
        .trace
        .to_canonical_json_bytes()
        .expect("canonical trace");
    canonical_hash(HashDomain::BenchGuard, &bytes)
}
