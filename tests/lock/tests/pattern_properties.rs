//! Pattern completion properties: visit-order confluence and idempotence.

use ges_kernel::graph::dag::dag_from_pattern;
use ges_kernel::graph::VarId;
use ges_kernel::pattern::{rebuild_pattern, revert_to_basic_pattern, MeekRules};
use lock_tests::fixtures::{numbered_dag, random_dag_edges};
use proptest::prelude::*;

fn random_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..=7)
        .prop_flat_map(|n| {
            (
                Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
                any::<u64>(),
            )
        })
        .prop_map(|(order, mask)| (order.len(), random_dag_edges(&order, mask)))
}

fn random_dag_and_visit_order() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<usize>)> {
    random_dag().prop_flat_map(|(n, edges)| {
        (
            Just(n),
            Just(edges),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn meek_completion_is_confluent((n, edges, visit) in random_dag_and_visit_order()) {
        let dag = numbered_dag(n, &edges);

        let mut reference = dag.clone();
        rebuild_pattern(&mut reference, None);

        let mut shuffled = dag;
        revert_to_basic_pattern(&mut shuffled);
        let order: Vec<VarId> = visit.iter().map(|&i| VarId::new(i as u32)).collect();
        MeekRules::new(None).with_visit_order(order).orient_implied(&mut shuffled);

        prop_assert_eq!(shuffled, reference);
    }

    #[test]
    fn rebuild_is_idempotent((n, edges) in random_dag()) {
        let mut once = numbered_dag(n, &edges);
        rebuild_pattern(&mut once, None);
        let mut twice = once.clone();
        rebuild_pattern(&mut twice, None);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn rebuild_preserves_skeleton_and_extension((n, edges) in random_dag()) {
        let dag = numbered_dag(n, &edges);
        let mut pattern = dag.clone();
        rebuild_pattern(&mut pattern, None);
        prop_assert_eq!(pattern.skeleton(), dag.skeleton());

        // Any consistent extension lies in the same class: its pattern is
        // the same pattern.
        let mut extension = dag_from_pattern(&pattern).unwrap();
        rebuild_pattern(&mut extension, None);
        prop_assert_eq!(extension, pattern);
    }
}
