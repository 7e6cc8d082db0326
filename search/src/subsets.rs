//! Subset enumeration for `T` and `H` sets.

use ges_kernel::graph::VarId;

/// All subsets of `items` with at most `max_size` elements, ordered by size
/// and then lexicographically by position. `items` is expected sorted, so
/// every subset comes out sorted.
#[must_use]
pub fn subsets_up_to(items: &[VarId], max_size: usize) -> Vec<Vec<VarId>> {
    let mut out = vec![Vec::new()];
    let top = max_size.min(items.len());
    for size in 1..=top {
        let mut idx: Vec<usize> = (0..size).collect();
        loop {
            out.push(idx.iter().map(|&i| items[i]).collect());
            // Advance the rightmost index that can still move.
            let Some(pos) = (0..size).rev().find(|&p| idx[p] < items.len() - size + p) else {
                break;
            };
            idx[pos] += 1;
            for q in pos + 1..size {
                idx[q] = idx[q - 1] + 1;
            }
        }
    }
    out
}
