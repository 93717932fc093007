//! Configuration options for the solvers.
//!
//! This module provides the configuration struct shared by the recursive
//! and the propagating solver, and the statistics both report after
//! training.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest supported die.
pub const MIN_SIDES: u8 = 2;

/// Largest supported die.
///
/// Dudo has `2 * sides` claims and each claim takes one bit of the
/// information set key.
pub const MAX_SIDES: u8 = 12;

/// Most information sets a solver may allocate.
///
/// Full-game Dudo has `sides * 2^(2 * sides)` information sets, so the
/// larger dice only fit with a claim-depth bound.
pub const MAX_INFO_SETS: u64 = 1 << 22;

/// Check that a game with `count` information sets fits in memory.
pub fn check_info_set_budget(count: u64) -> Result<(), ConfigError> {
    if count > MAX_INFO_SETS {
        return Err(ConfigError::TooManyInfoSets {
            count,
            max: MAX_INFO_SETS,
        });
    }
    Ok(())
}

/// Configuration for a training run.
///
/// # Example
/// ```
/// use dudo_cfr::cfr::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert_eq!(config.sides, 6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Number of faces on each die.
    pub sides: u8,

    /// Maximum number of claims before the next player must challenge.
    ///
    /// `None` plays the full game. Only Dudo uses this bound; Liar's Die is
    /// always played to its natural end.
    pub claim_depth: Option<usize>,

    /// Fraction of a `train` call after which every strategy sum is reset.
    ///
    /// Early iterations average in an immature strategy; discarding them
    /// keeps regrets but restarts the average. `None` never discards.
    pub discard_fraction: Option<f64>,

    /// Random seed for the dice.
    ///
    /// If set, rolls are reproducible. If `None`, the generator is seeded
    /// from entropy.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sides: 6,
            claim_depth: None,
            discard_fraction: None,
            seed: None,
        }
    }
}

impl SolverConfig {
    /// Create a new SolverConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of die sides.
    pub fn with_sides(mut self, sides: u8) -> Self {
        self.sides = sides;
        self
    }

    /// Builder method: bound the number of claims.
    pub fn with_claim_depth(mut self, depth: usize) -> Self {
        self.claim_depth = Some(depth);
        self
    }

    /// Builder method: discard strategy sums after this fraction of training.
    pub fn with_discard_fraction(mut self, fraction: f64) -> Self {
        self.discard_fraction = Some(fraction);
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of Dudo claims for this die (two counts per face).
    pub fn num_claims(&self) -> usize {
        2 * self.sides as usize
    }

    /// Claim depth actually in force: the configured bound or the full game.
    pub fn effective_claim_depth(&self) -> usize {
        self.claim_depth.unwrap_or_else(|| self.num_claims())
    }

    /// Index of the iteration (1-based, within one `train` call) after
    /// which strategy sums are discarded.
    ///
    /// Returns `None` when discarding is disabled or would happen before
    /// the first iteration.
    pub fn discard_point(&self, iterations: u64) -> Option<u64> {
        let fraction = self.discard_fraction?;
        let point = (fraction * iterations as f64).floor() as u64;
        (point > 0).then_some(point)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SIDES..=MAX_SIDES).contains(&self.sides) {
            return Err(ConfigError::InvalidSides(self.sides));
        }

        if let Some(fraction) = self.discard_fraction {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(ConfigError::InvalidDiscardFraction(fraction));
            }
        }

        if let Some(depth) = self.claim_depth {
            if depth == 0 || depth > self.num_claims() {
                return Err(ConfigError::InvalidClaimDepth {
                    depth,
                    max: self.num_claims(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur when validating a solver configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Die size outside the supported range.
    #[error("die must have between 2 and 12 sides, got {0}")]
    InvalidSides(u8),

    /// Discard fraction is out of range [0, 1].
    #[error("discard fraction {0} is out of range [0, 1]")]
    InvalidDiscardFraction(f64),

    /// Claim depth is zero or longer than the claim sequence.
    #[error("claim depth {depth} must be between 1 and {max}")]
    InvalidClaimDepth {
        /// Requested depth.
        depth: usize,
        /// Number of claims in the game.
        max: usize,
    },

    /// The game would allocate more nodes than the budget allows.
    #[error("game has {count} information sets, more than the limit of {max}; bound the claim depth")]
    TooManyInfoSets {
        /// Information sets the game needs.
        count: u64,
        /// Largest allowed count.
        max: u64,
    },
}

/// Statistics tracked during training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of information sets in the node store.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Sum of player 0's root utility over all iterations.
    pub utility_sum: f64,

    /// Iteration after which strategy sums were last discarded.
    pub discarded_at: Option<u64>,
}

impl TrainingStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }

    /// Average game value for player 0 over all iterations so far.
    pub fn game_value(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.utility_sum / self.iterations as f64
        }
    }
}
