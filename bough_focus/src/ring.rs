// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded walks over explicit focus rings.

/// Walk a focus ring from `start` and return the first node accepted by `accept`.
///
/// `step` yields the neighbour of a node (next or previous, depending on the walk
/// direction), or `None` where the ring is open. The walk never returns `start` itself. It
/// stops with `None` when it returns to `start`, reaches an open end, or has taken `limit`
/// steps. The limit guards against links that cycle without passing back through `start`;
/// pass the number of nodes that could possibly be on the ring.
pub fn walk_ring<K: Copy + Eq>(
    start: K,
    mut step: impl FnMut(K) -> Option<K>,
    mut accept: impl FnMut(K) -> bool,
    limit: usize,
) -> Option<K> {
    let mut node = step(start);
    for _ in 0..limit {
        let current = node?;
        if current == start {
            return None;
        }
        if accept(current) {
            return Some(current);
        }
        node = step(current);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_of(n: usize) -> impl Fn(usize) -> Option<usize> {
        move |k| Some((k + 1) % n)
    }

    #[test]
    fn finds_only_eligible_member_from_any_start() {
        for start in 0..3 {
            let found = walk_ring(start, ring_of(3), |k| k == 1, 3);
            let expected = if start == 1 { None } else { Some(1) };
            assert_eq!(found, expected, "start {start}");
        }
    }

    #[test]
    fn all_ineligible_ring_terminates() {
        assert_eq!(walk_ring(0, ring_of(5), |_| false, 5), None);
    }

    #[test]
    fn open_chain_stops_at_end() {
        let chain = |k: usize| if k < 3 { Some(k + 1) } else { None };
        assert_eq!(walk_ring(0, chain, |k| k == 9, 100), None);
        assert_eq!(walk_ring(0, chain, |k| k == 2, 100), Some(2));
    }

    #[test]
    fn cycle_not_through_start_is_bounded() {
        // 0 -> 1 -> 2 -> 1 -> 2 ...
        let lasso = |k: usize| Some(if k == 2 { 1 } else { k + 1 });
        assert_eq!(walk_ring(0, lasso, |_| false, 10), None);
    }
}
