//! Under background knowledge the rebuilt pattern can land in a different
//! equivalence class than the operator's result. The recorded score must
//! still be the score of the graph the step leaves behind.

use ges_harness::sem_bic::SemBicScore;
use ges_kernel::knowledge::Knowledge;
use ges_search::{search_with_observer, PhaseV1, ScoreCache, SearchOptions, SearchPolicyV1};
use lock_tests::fixtures::{covariance_of, numbered_sem};
use lock_tests::recording::RecordingObserver;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-7 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn reoriented_steps_record_the_rebuilt_score() {
    let edges = [(0, 2), (0, 3), (1, 2), (2, 3), (2, 4), (2, 5), (4, 5)];
    let cov = covariance_of(&numbered_sem(6, &edges));
    let score = SemBicScore::new(cov.clone(), 1.0).unwrap();
    let mut knowledge = Knowledge::new();
    knowledge.set_forbidden("V0", "V3");
    knowledge.set_forbidden("V2", "V3");

    let mut observer = RecordingObserver::default();
    let result = search_with_observer(
        cov.variables(),
        &score,
        &SearchPolicyV1::default(),
        SearchOptions {
            knowledge: Some(&knowledge),
            ..SearchOptions::default()
        },
        &mut observer,
    )
    .unwrap();
    let trace = &result.trace;
    assert!(result.is_converged());
    assert!(trace.steps_in(PhaseV1::Backward).count() > 0);

    let mut fresh = ScoreCache::new(&score);
    let mut running = trace.initial_score;
    for (step, graph) in &observer.steps {
        assert!(step.bump > 0.0, "step {} bump {}", step.index, step.bump);
        assert_eq!(step.score_before.to_bits(), running.to_bits());
        let rescored = fresh.score_pattern(graph).unwrap().unwrap();
        assert!(
            close(step.score_after, rescored),
            "step {} ({:?}): recorded {} vs rescored {}",
            step.index,
            step.phase,
            step.score_after,
            rescored
        );
        running = step.score_after;
    }

    let recomputed = trace.recomputed_score.unwrap();
    assert!(
        close(result.score, recomputed),
        "running {} vs recomputed {}",
        result.score,
        recomputed
    );
}
