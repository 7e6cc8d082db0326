//! Property tests over random linear SEMs: every accepted step raises the
//! score, the running score matches a from-scratch recomputation, and no
//! intermediate graph carries a directed cycle. The second property repeats
//! the step checks with random knowledge, starting graphs and adjacency
//! restrictions.

use ges_harness::sem_bic::SemBicScore;
use ges_kernel::graph::dag::dag_from_pattern;
use ges_kernel::graph::GraphStore;
use ges_kernel::knowledge::Knowledge;
use ges_search::{search_with_observer, ScoreCache, SearchOptions, SearchPolicyV1};
use lock_tests::fixtures::{covariance_of, numbered_dag, numbered_sem, random_dag_edges};
use lock_tests::recording::RecordingObserver;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use proptest::prelude::*;

/// Independent acyclicity oracle over the directed edges only.
fn directed_cycle(graph: &GraphStore) -> bool {
    let mut g = DiGraph::<(), ()>::new();
    let nodes: Vec<_> = (0..graph.num_vars()).map(|_| g.add_node(())).collect();
    for e in graph.edges() {
        if let (Some(t), Some(h)) = (e.tail(), e.head()) {
            g.add_edge(nodes[t.index()], nodes[h.index()], ());
        }
    }
    is_cyclic_directed(&g)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-7 * a.abs().max(b.abs()).max(1.0)
}

fn random_sem() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (3usize..=6)
        .prop_flat_map(|n| {
            (
                Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
                any::<u64>(),
            )
        })
        .prop_map(|(order, mask)| (order.len(), random_dag_edges(&order, mask)))
}

/// Ordered pairs `(a, b)`, `a != b`, over `n` variables selected by `mask`.
fn ordered_pairs(n: usize, mask: u64) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|a| (0..n).filter(move |&b| b != a).map(move |b| (a, b)))
        .enumerate()
        .filter(|&(k, _)| k < 64 && mask & (1 << k) != 0)
        .map(|(_, pair)| pair)
        .collect()
}

#[derive(Debug, Clone)]
struct KnowledgePlan {
    /// Sparse: two masks are intersected.
    forbidden: (u64, u64),
    required: Vec<(usize, usize)>,
    /// Variables below the split go to tier 0, the rest to tier 1.
    tier_split: Option<usize>,
}

impl KnowledgePlan {
    fn build(&self, n: usize) -> Knowledge {
        let name = |i: usize| format!("V{i}");
        let mut k = Knowledge::new();
        for (a, b) in ordered_pairs(n, self.forbidden.0 & self.forbidden.1) {
            k.set_forbidden(&name(a), &name(b));
        }
        if let Some(split) = self.tier_split {
            for i in 0..n {
                k.add_to_tier(usize::from(i >= split), &name(i));
            }
        }
        let mut kept: Vec<(usize, usize)> = Vec::new();
        for &(a, b) in &self.required {
            let (a, b) = (a % n, b % n);
            let (from, to) = (name(a), name(b));
            if a == b
                || k.is_forbidden(&from, &to)
                || k.is_forbidden_by_tiers(&from, &to)
                || kept.contains(&(b, a))
            {
                continue;
            }
            k.set_required(&from, &to);
            kept.push((a, b));
        }
        k
    }
}

fn knowledge_plan() -> impl Strategy<Value = KnowledgePlan> {
    (
        (any::<u64>(), any::<u64>()),
        prop::collection::vec((0usize..6, 0usize..6), 0..=2),
        prop::option::of(1usize..=3),
    )
        .prop_map(|(forbidden, required, tier_split)| KnowledgePlan {
            forbidden,
            required,
            tier_split,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn steps_are_monotone_acyclic_and_consistent(
        (n, edges) in random_sem(),
        depth in 0usize..=2,
        penalty in prop_oneof![Just(0.5), Just(1.0), Just(2.0), Just(4.0)],
    ) {
        let cov = covariance_of(&numbered_sem(n, &edges));
        let score = SemBicScore::new(cov.clone(), penalty).unwrap();
        let policy = SearchPolicyV1 { t_subset_depth: depth, ..SearchPolicyV1::default() };
        let mut observer = RecordingObserver::default();
        let result = search_with_observer(
            cov.variables(),
            &score,
            &policy,
            SearchOptions::default(),
            &mut observer,
        )
        .unwrap();
        let trace = &result.trace;

        prop_assert!(result.is_converged());
        prop_assert_eq!(observer.steps.len(), trace.steps.len());

        let mut running = trace.initial_score;
        for (step, graph) in &observer.steps {
            prop_assert!(step.bump > 0.0);
            prop_assert!(step.score_after > step.score_before);
            prop_assert_eq!(step.score_before.to_bits(), running.to_bits());
            prop_assert!(close(step.score_after - step.score_before, step.bump));
            prop_assert!(!directed_cycle(graph), "cycle after step {}", step.index);
            prop_assert_eq!(step.edge_count, graph.edge_count() as u64);
            running = step.score_after;
        }
        prop_assert_eq!(running.to_bits(), result.score.to_bits());

        let recomputed = trace.recomputed_score.unwrap();
        prop_assert!(
            close(recomputed, result.score),
            "running {} vs recomputed {}",
            result.score,
            recomputed
        );

        let dag = dag_from_pattern(&result.pattern).unwrap();
        prop_assert!(!directed_cycle(&dag));
        prop_assert_eq!(dag.edge_count(), result.pattern.edge_count());
    }

    #[test]
    fn constrained_steps_track_the_rebuilt_pattern_score(
        (n, edges) in random_sem(),
        plan in knowledge_plan(),
        initial_mask in prop::option::of(any::<u64>()),
        restriction_mask in prop::option::of(any::<u64>()),
        penalty in prop_oneof![Just(1.0), Just(2.0)],
    ) {
        let cov = covariance_of(&numbered_sem(n, &edges));
        let score = SemBicScore::new(cov.clone(), penalty).unwrap();
        let knowledge = plan.build(n);
        let identity: Vec<usize> = (0..n).collect();
        let initial = initial_mask.map(|m| numbered_dag(n, &random_dag_edges(&identity, m)));
        let restriction = restriction_mask.map(|m| {
            let mut allowed: Vec<(usize, usize)> = edges
                .iter()
                .map(|&(a, b)| (a.min(b), a.max(b)))
                .chain(random_dag_edges(&identity, m))
                .collect();
            allowed.sort_unstable();
            allowed.dedup();
            numbered_dag(n, &allowed).skeleton()
        });

        let mut observer = RecordingObserver::default();
        let result = search_with_observer(
            cov.variables(),
            &score,
            &SearchPolicyV1::default(),
            SearchOptions {
                knowledge: Some(&knowledge),
                initial_graph: initial.as_ref(),
                adjacency_restriction: restriction.as_ref(),
                ..SearchOptions::default()
            },
            &mut observer,
        )
        .unwrap();
        let trace = &result.trace;

        prop_assert!(result.is_converged());
        prop_assert_eq!(observer.steps.len(), trace.steps.len());

        let mut fresh = ScoreCache::new(&score);
        let mut running = trace.initial_score;
        for (step, graph) in &observer.steps {
            prop_assert!(step.bump > 0.0);
            prop_assert_eq!(step.score_before.to_bits(), running.to_bits());
            prop_assert!(!directed_cycle(graph), "cycle after step {}", step.index);
            prop_assert_eq!(step.edge_count, graph.edge_count() as u64);
            let rescored = fresh.score_pattern(graph).unwrap().unwrap();
            prop_assert!(
                close(step.score_after, rescored),
                "step {}: recorded {} vs rescored {}",
                step.index,
                step.score_after,
                rescored
            );
            if knowledge.is_empty() {
                prop_assert!(step.score_after > step.score_before);
                prop_assert!(close(step.score_after - step.score_before, step.bump));
            }
            running = step.score_after;
        }
        prop_assert_eq!(running.to_bits(), result.score.to_bits());

        let recomputed = trace.recomputed_score.unwrap();
        prop_assert!(
            close(recomputed, result.score),
            "running {} vs recomputed {}",
            result.score,
            recomputed
        );
    }
}
