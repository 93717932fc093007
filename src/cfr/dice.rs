//! Sources of private dice rolls.
//!
//! The solvers only need fresh uniform rolls; they never see the
//! generator. [`UniformDice`] wraps any `rand` generator and
//! [`ReplayDice`] plays back a fixed sequence so two runs can be compared
//! bit for bit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces die rolls in `1..=sides`.
pub trait RollSource {
    /// Roll one die.
    fn roll(&mut self, sides: u8) -> u8;
}

/// Uniform rolls drawn from a random number generator.
#[derive(Debug, Clone)]
pub struct UniformDice<R> {
    rng: R,
}

impl<R: Rng> UniformDice<R> {
    /// Roll dice with the given generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl UniformDice<StdRng> {
    /// Seeded dice if `seed` is set, entropy-seeded otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng)
    }
}

impl<R: Rng> RollSource for UniformDice<R> {
    fn roll(&mut self, sides: u8) -> u8 {
        self.rng.gen_range(1..=sides)
    }
}

/// Replays a recorded sequence of rolls, starting over when exhausted.
#[derive(Debug, Clone)]
pub struct ReplayDice {
    rolls: Vec<u8>,
    position: usize,
}

impl ReplayDice {
    /// Replay `rolls` in order.
    ///
    /// # Panics
    /// Panics if `rolls` is empty.
    pub fn new(rolls: Vec<u8>) -> Self {
        assert!(!rolls.is_empty(), "replay needs at least one roll");
        Self { rolls, position: 0 }
    }
}

impl RollSource for ReplayDice {
    fn roll(&mut self, sides: u8) -> u8 {
        let roll = self.rolls[self.position % self.rolls.len()];
        debug_assert!((1..=sides).contains(&roll), "replayed roll {} on a d{}", roll, sides);
        self.position += 1;
        roll
    }
}
