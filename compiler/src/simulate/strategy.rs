//! Balancer choice during simulation.
//!
//! Only `random` consults the picker. `roundRobin` and `leastPing` take the
//! first candidate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::parse::types::BalancerStrategy;

pub trait BalancerPicker {
    /// Index in `0..candidates`; `candidates` is never zero.
    fn pick(&mut self, candidates: usize) -> usize;
}

/// Uniform choice.
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    pub fn new() -> Self {
        RandomPicker {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomPicker {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl BalancerPicker for RandomPicker {
    fn pick(&mut self, candidates: usize) -> usize {
        self.rng.gen_range(0..candidates)
    }
}

/// Always the first candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstPicker;

impl BalancerPicker for FirstPicker {
    fn pick(&mut self, _candidates: usize) -> usize {
        0
    }
}

pub fn choose(strategy: BalancerStrategy, candidates: usize, picker: &mut dyn BalancerPicker) -> usize {
    match strategy {
        BalancerStrategy::Random => picker.pick(candidates).min(candidates.saturating_sub(1)),
        BalancerStrategy::RoundRobin | BalancerStrategy::LeastPing => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_picker_stays_in_range() {
        let mut picker = RandomPicker::seeded(7);
        for _ in 0..100 {
            assert!(picker.pick(3) < 3);
        }
    }

    #[test]
    fn non_random_strategies_take_first() {
        struct Last;
        impl BalancerPicker for Last {
            fn pick(&mut self, candidates: usize) -> usize {
                candidates - 1
            }
        }
        assert_eq!(choose(BalancerStrategy::RoundRobin, 4, &mut Last), 0);
        assert_eq!(choose(BalancerStrategy::LeastPing, 4, &mut Last), 0);
        assert_eq!(choose(BalancerStrategy::Random, 4, &mut Last), 3);
    }
}
