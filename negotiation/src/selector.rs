//! Pluggable selection strategy for every random choice made around the core.
//!
//! The negotiation core itself is deterministic. Randomness only enters
//! through preference generation and the scheduler's activation order, and
//! both go through a [`Selector`] so tests can swap in [`FirstSelector`].

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Source of choices for preference generation and agent activation order.
pub trait Selector {
    /// Pick an index in `0..len`. Returns `None` when `len == 0`.
    fn pick_index(&mut self, len: usize) -> Option<usize>;

    /// Reorder `items` in place.
    fn shuffle<T>(&mut self, items: &mut [T]);

    /// Pick one element of `options`.
    fn pick<'a, T>(&mut self, options: &'a [T]) -> Option<&'a T> {
        self.pick_index(options.len()).map(|i| &options[i])
    }
}

/// Seeded pseudo-random selector; identical seeds give identical runs.
#[derive(Debug, Clone)]
pub struct SeededSelector {
    rng: StdRng,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Selector for SeededSelector {
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.rng.gen_range(0..len))
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

/// Deterministic selector: always the first option, never reorders.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSelector;

impl Selector for FirstSelector {
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then_some(0)
    }

    fn shuffle<T>(&mut self, _items: &mut [T]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_selector_is_reproducible() {
        let mut a = SeededSelector::new(7);
        let mut b = SeededSelector::new(7);
        let picks_a: Vec<_> = (0..20).map(|_| a.pick_index(5)).collect();
        let picks_b: Vec<_> = (0..20).map(|_| b.pick_index(5)).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|p| matches!(p, Some(i) if *i < 5)));

        let mut xs: Vec<u32> = (0..10).collect();
        let mut ys = xs.clone();
        SeededSelector::new(3).shuffle(&mut xs);
        SeededSelector::new(3).shuffle(&mut ys);
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_empty_choice() {
        assert_eq!(SeededSelector::new(1).pick_index(0), None);
        assert_eq!(FirstSelector.pick_index(0), None);
        let empty: [u8; 0] = [];
        assert_eq!(FirstSelector.pick(&empty), None);
    }

    #[test]
    fn test_first_selector() {
        let mut selector = FirstSelector;
        assert_eq!(selector.pick(&["a", "b", "c"]), Some(&"a"));
        let mut xs = vec![3, 1, 2];
        selector.shuffle(&mut xs);
        assert_eq!(xs, vec![3, 1, 2]);
    }
}
