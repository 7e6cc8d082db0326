//! `valid_insert` / `valid_delete` against a brute-force oracle on small
//! synthetic mixed graphs.

use ges_kernel::graph::{GraphStore, VarId};
use ges_kernel::operators::validity::{na_yx, t_neighbors, valid_delete, valid_insert};
use lock_tests::fixtures::numbered_vars;
use proptest::prelude::*;

/// Edge kinds per unordered pair `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    None,
    Forward,
    Backward,
    Undirected,
}

fn kind() -> impl Strategy<Value = Kind> {
    prop_oneof![
        Just(Kind::None),
        Just(Kind::Forward),
        Just(Kind::Backward),
        Just(Kind::Undirected),
    ]
}

/// Adjacency matrix view independent of `GraphStore`.
struct Oracle {
    n: usize,
    /// `step[a][b]`: a semi-directed walk may go from `a` to `b`.
    step: Vec<Vec<bool>>,
    adjacent: Vec<Vec<bool>>,
}

impl Oracle {
    fn new(n: usize, kinds: &[Kind]) -> (Self, GraphStore) {
        let mut graph = GraphStore::new(numbered_vars(n));
        let mut step = vec![vec![false; n]; n];
        let mut adjacent = vec![vec![false; n]; n];
        let mut k = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (VarId::new(i as u32), VarId::new(j as u32));
                match kinds[k] {
                    Kind::None => {}
                    Kind::Forward => {
                        graph.add_directed_edge(a, b);
                        step[i][j] = true;
                    }
                    Kind::Backward => {
                        graph.add_directed_edge(b, a);
                        step[j][i] = true;
                    }
                    Kind::Undirected => {
                        graph.add_undirected_edge(a, b);
                        step[i][j] = true;
                        step[j][i] = true;
                    }
                }
                if kinds[k] != Kind::None {
                    adjacent[i][j] = true;
                    adjacent[j][i] = true;
                }
                k += 1;
            }
        }
        (Self { n, step, adjacent }, graph)
    }

    fn clique(&self, nodes: &[VarId]) -> bool {
        nodes.iter().all(|a| {
            nodes
                .iter()
                .all(|b| a == b || self.adjacent[a.index()][b.index()])
        })
    }

    /// Exhaustive depth-first search over simple paths.
    fn path_avoiding(&self, from: usize, to: usize, blocked: &[bool]) -> bool {
        fn walk(
            o: &Oracle,
            at: usize,
            to: usize,
            blocked: &[bool],
            on_path: &mut Vec<bool>,
        ) -> bool {
            if at == to {
                return true;
            }
            for next in 0..o.n {
                if o.step[at][next] && !on_path[next] && !blocked[next] {
                    on_path[next] = true;
                    if walk(o, next, to, blocked, on_path) {
                        return true;
                    }
                    on_path[next] = false;
                }
            }
            false
        }
        let mut on_path = vec![false; self.n];
        on_path[from] = true;
        walk(self, from, to, blocked, &mut on_path)
    }
}

/// Position of the pair `{a, b}` in the row-major `i < j` pair order.
fn pair_index(n: usize, a: usize, b: usize) -> usize {
    let (i, j) = (a.min(b), a.max(b));
    i * (2 * n - i - 1) / 2 + (j - i - 1)
}

/// A graph plus a distinct pair `(x, y)` and a subset mask.
fn graph_case() -> impl Strategy<Value = (usize, Vec<Kind>, usize, usize, u8)> {
    (2usize..=6).prop_flat_map(|n| {
        (
            Just(n),
            proptest::collection::vec(kind(), n * (n - 1) / 2),
            0..n,
            1..n,
            any::<u8>(),
        )
            .prop_map(|(n, kinds, x, offset, mask)| (n, kinds, x, (x + offset) % n, mask))
    })
}

fn subset(items: &[VarId], mask: u8) -> Vec<VarId> {
    items
        .iter()
        .enumerate()
        .filter(|&(i, _)| i < 8 && mask & (1 << i) != 0)
        .map(|(_, &v)| v)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn valid_insert_matches_brute_force((n, mut kinds, xi, yi, mask) in graph_case()) {
        kinds[pair_index(n, xi, yi)] = Kind::None;
        let (oracle, graph) = Oracle::new(n, &kinds);
        let (x, y) = (VarId::new(xi as u32), VarId::new(yi as u32));

        let na = na_yx(&graph, x, y);
        let t = subset(&t_neighbors(&graph, x, y), mask);

        let mut cond: Vec<VarId> = t.iter().chain(&na).copied().collect();
        cond.sort_unstable();
        cond.dedup();
        let mut blocked = vec![false; n];
        for v in &cond {
            blocked[v.index()] = true;
        }
        let expected = oracle.clique(&cond) && !oracle.path_avoiding(yi, xi, &blocked);

        prop_assert_eq!(valid_insert(&graph, x, y, &t, &na), expected);
    }

    #[test]
    fn valid_delete_matches_brute_force(
        (n, mut kinds, xi, yi, mask) in graph_case(),
        present in prop_oneof![Just(Kind::Forward), Just(Kind::Backward), Just(Kind::Undirected)],
    ) {
        kinds[pair_index(n, xi, yi)] = present;
        let (oracle, graph) = Oracle::new(n, &kinds);
        let (x, y) = (VarId::new(xi as u32), VarId::new(yi as u32));

        let na = na_yx(&graph, x, y);
        let h = subset(&na, mask);
        let rest: Vec<VarId> = na.iter().copied().filter(|v| !h.contains(v)).collect();

        prop_assert_eq!(valid_delete(&graph, &h, &na), oracle.clique(&rest));
    }

    #[test]
    fn neighbor_sets_match_definitions((n, kinds, xi, yi, _mask) in graph_case()) {
        let (oracle, graph) = Oracle::new(n, &kinds);
        let (x, y) = (VarId::new(xi as u32), VarId::new(yi as u32));

        let undirected_to_y = |z: usize| oracle.step[z][yi] && oracle.step[yi][z];
        let expected_na: Vec<VarId> = (0..n)
            .filter(|&z| z != xi && undirected_to_y(z) && oracle.adjacent[z][xi])
            .map(|z| VarId::new(z as u32))
            .collect();
        let expected_t: Vec<VarId> = (0..n)
            .filter(|&z| z != xi && undirected_to_y(z) && !oracle.adjacent[z][xi])
            .map(|z| VarId::new(z as u32))
            .collect();

        prop_assert_eq!(na_yx(&graph, x, y), expected_na);
        prop_assert_eq!(t_neighbors(&graph, x, y), expected_t);
    }
}
