//! Information set nodes and regret matching.
//!
//! A [`DecisionNode`] owns the cumulative regrets and strategy sums of one
//! information set. Both solvers share it; the propagating solver also
//! uses the per-iteration [`SweepState`] carried by each node.

use serde::{Deserialize, Serialize};

/// Inclusive range of legal action indices at an information set.
///
/// Action indices are global to the game (e.g. Dudo claim `7`), while the
/// vectors stored in a node are indexed from zero; [`ActionRange::offset`]
/// converts between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRange {
    lower: usize,
    upper: usize,
}

impl ActionRange {
    /// Create a range covering `lower..=upper`.
    ///
    /// # Panics
    /// Panics if the range is empty. Callers derive ranges from the game
    /// rules, so an empty range is a rules bug.
    pub fn new(lower: usize, upper: usize) -> Self {
        assert!(
            lower <= upper,
            "empty action range {}..={}",
            lower,
            upper
        );
        Self { lower, upper }
    }

    /// First legal action.
    pub fn lower(&self) -> usize {
        self.lower
    }

    /// Last legal action.
    pub fn upper(&self) -> usize {
        self.upper
    }

    /// Number of legal actions.
    pub fn len(&self) -> usize {
        self.upper - self.lower + 1
    }

    /// Ranges are never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `action` is legal.
    pub fn contains(&self, action: usize) -> bool {
        (self.lower..=self.upper).contains(&action)
    }

    /// Position of `action` inside the node's vectors.
    pub fn offset(&self, action: usize) -> usize {
        debug_assert!(self.contains(action));
        action - self.lower
    }

    /// Iterate over the legal actions in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.lower..=self.upper
    }
}

/// Per-iteration state used by the propagating solver.
///
/// All fields are transient: reach accumulators are zeroed at the end of
/// every backward sweep and the stamps record the last iteration in which
/// the node was visited in each direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepState {
    /// Reach probability contributed by the acting player.
    pub reach_player: f64,
    /// Reach probability contributed by everyone else.
    pub reach_opponent: f64,
    /// Counterfactual utility computed in the backward sweep.
    pub utility: f64,
    /// Last iteration whose forward sweep processed this node.
    pub forward_stamp: u64,
    /// Last iteration whose backward sweep finalized this node.
    pub backward_stamp: u64,
}

/// One information set for the player to move.
#[derive(Debug, Clone)]
pub struct DecisionNode {
    label: String,
    actions: ActionRange,
    regret_sum: Vec<f64>,
    strategy: Vec<f64>,
    strategy_sum: Vec<f64>,
    sweep: SweepState,
}

impl DecisionNode {
    /// Create a node with zeroed regrets for the given legal actions.
    pub fn new(label: impl Into<String>, actions: ActionRange) -> Self {
        let n = actions.len();
        Self {
            label: label.into(),
            actions,
            regret_sum: vec![0.0; n],
            strategy: vec![1.0 / n as f64; n],
            strategy_sum: vec![0.0; n],
            sweep: SweepState::default(),
        }
    }

    /// Human-readable identifier; never used for lookup.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Legal actions at this node.
    pub fn actions(&self) -> ActionRange {
        self.actions
    }

    /// Number of legal actions.
    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Compute the current strategy by regret matching.
    ///
    /// The strategy is proportional to positive regrets. If no regret is
    /// positive, returns a uniform strategy. As a side effect the strategy
    /// is added to the strategy sum weighted by `reach_weight`, so this
    /// must be called exactly once per visit.
    pub fn current_strategy(&mut self, reach_weight: f64) -> &[f64] {
        let mut normalizing_sum = 0.0;
        for (s, &r) in self.strategy.iter_mut().zip(&self.regret_sum) {
            *s = r.max(0.0);
            normalizing_sum += *s;
        }

        let n = self.strategy.len();
        for (s, sum) in self.strategy.iter_mut().zip(self.strategy_sum.iter_mut()) {
            if normalizing_sum > 0.0 {
                *s /= normalizing_sum;
            } else {
                *s = 1.0 / n as f64;
            }
            *sum += reach_weight * *s;
        }

        &self.strategy
    }

    /// The strategy produced by the last call to [`current_strategy`].
    ///
    /// [`current_strategy`]: DecisionNode::current_strategy
    pub fn strategy(&self) -> &[f64] {
        &self.strategy
    }

    /// Time-averaged strategy (Nash equilibrium approximation).
    ///
    /// Falls back to uniform while the strategy sum is all zero.
    pub fn average_strategy(&self) -> Vec<f64> {
        let total: f64 = self.strategy_sum.iter().sum();
        let n = self.strategy_sum.len();
        if total > 0.0 {
            self.strategy_sum.iter().map(|&x| x / total).collect()
        } else {
            vec![1.0 / n as f64; n]
        }
    }

    /// Add `weight * (u[a] - node_utility)` to each action's regret.
    pub fn accumulate_regret(&mut self, action_utilities: &[f64], node_utility: f64, weight: f64) {
        debug_assert_eq!(action_utilities.len(), self.regret_sum.len());
        for (r, &u) in self.regret_sum.iter_mut().zip(action_utilities) {
            *r += weight * (u - node_utility);
        }
    }

    /// Zero the strategy sum, keeping regrets.
    pub fn reset_strategy_sum(&mut self) {
        self.strategy_sum.iter_mut().for_each(|x| *x = 0.0);
    }

    /// Cumulative counterfactual regret per legal action.
    pub fn regret_sum(&self) -> &[f64] {
        &self.regret_sum
    }

    /// Cumulative reach-weighted strategy per legal action.
    pub fn strategy_sum(&self) -> &[f64] {
        &self.strategy_sum
    }

    /// Propagation state for the current iteration.
    pub fn sweep(&self) -> &SweepState {
        &self.sweep
    }

    pub(crate) fn sweep_mut(&mut self) -> &mut SweepState {
        &mut self.sweep
    }
}
