use crate::glm;
use crate::simplify::quadric::solve_target;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// one valid vertex pair with its cached contraction target and cost
///
/// identity is the unordered index set; the cached data is never part of it
#[derive(Debug, Copy, Clone)]
pub(crate) struct Pair {
    pub(crate) v1: usize,
    pub(crate) v2: usize,
    pub(crate) target: glm::DVec3,
    pub(crate) cost: f64,
}

/// canonical ``(smaller, larger)`` key for an unordered pair
pub(crate) fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// computes the contraction data for the unordered pair ``{u, v}``
pub(crate) fn solve_pair(
    u: usize,
    v: usize,
    positions: &[glm::DVec3],
    quadrics: &[glm::DMat4],
) -> Pair {
    let (v1, v2) = pair_key(u, v);
    let combined = quadrics[v1] + quadrics[v2];
    let (target, cost) = solve_target(&combined, &positions[v1], &positions[v2]);
    Pair {
        v1,
        v2,
        target,
        cost,
    }
}

/// queue position of a pair: ascending cost, ties broken by ``(v1, v2)``
#[derive(Debug, Copy, Clone)]
struct QueueEntry {
    cost: f64,
    v1: usize,
    v2: usize,
}

impl QueueEntry {
    fn of(pair: &Pair) -> Self {
        Self {
            cost: pair.cost,
            v1: pair.v1,
            v2: pair.v2,
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.v1.cmp(&other.v1))
            .then_with(|| self.v2.cmp(&other.v2))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

/// set of pairs ordered by contraction cost
///
/// a resident entry is immutable: the contraction loop removes a pair before
/// recomputing its cost and inserts the rebuilt pair afterwards
#[derive(Debug, Default)]
pub(crate) struct PairQueue {
    ordered: BTreeSet<QueueEntry>,
}

impl PairQueue {
    pub(crate) fn insert(&mut self, pair: &Pair) {
        self.ordered.insert(QueueEntry::of(pair));
    }

    pub(crate) fn remove(&mut self, pair: &Pair) -> bool {
        self.ordered.remove(&QueueEntry::of(pair))
    }

    /// pops the cheapest pair, yielding its canonical key
    pub(crate) fn pop_min(&mut self) -> Option<(usize, usize)> {
        self.ordered.pop_first().map(|entry| (entry.v1, entry.v2))
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, pair: &Pair) -> bool {
        self.ordered.contains(&QueueEntry::of(pair))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.ordered.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(v1: usize, v2: usize, cost: f64) -> Pair {
        Pair {
            v1,
            v2,
            target: glm::DVec3::zeros(),
            cost,
        }
    }

    #[test]
    fn pops_ascending_by_cost() {
        let mut queue = PairQueue::default();
        queue.insert(&pair(0, 1, 3.0));
        queue.insert(&pair(1, 2, 0.5));
        queue.insert(&pair(2, 3, 1.5));
        assert_eq!(queue.pop_min(), Some((1, 2)));
        assert_eq!(queue.pop_min(), Some((2, 3)));
        assert_eq!(queue.pop_min(), Some((0, 1)));
        assert_eq!(queue.pop_min(), None);
    }

    #[test]
    fn equal_costs_break_ties_on_indices() {
        let mut queue = PairQueue::default();
        queue.insert(&pair(4, 7, 1.0));
        queue.insert(&pair(0, 9, 1.0));
        queue.insert(&pair(4, 5, 1.0));
        assert_eq!(queue.pop_min(), Some((0, 9)));
        assert_eq!(queue.pop_min(), Some((4, 5)));
        assert_eq!(queue.pop_min(), Some((4, 7)));
    }

    #[test]
    fn remove_targets_one_resident_pair() {
        let mut queue = PairQueue::default();
        let keep = pair(0, 1, 2.0);
        let drop = pair(0, 2, 2.0);
        queue.insert(&keep);
        queue.insert(&drop);
        assert!(queue.remove(&drop));
        assert!(!queue.remove(&drop));
        assert!(queue.contains(&keep));
        assert_eq!(queue.len(), 1);
    }
}
