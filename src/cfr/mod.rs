//! CFR (Counterfactual Regret Minimization) solvers.
//!
//! This module provides two solvers that share the same node type, the
//! same regret-matching rule and the same training loop:
//!
//! - [`RecursiveSolver`]: vanilla CFR for Dudo. Walks the game tree depth
//!   first every iteration and creates nodes on first visit.
//! - [`PropagatingSolver`]: two-pass CFR over any [`Topology`]. Creates
//!   every node up front, then pushes reach probabilities forward and
//!   utilities backward through a fixed depth order.
//!
//! # Usage
//!
//! 1. Build a [`SolverConfig`] (die size, claim depth, discard fraction,
//!    seed)
//! 2. Create a solver; the configuration is validated here
//! 3. Call [`Trainer::train`] to run iterations
//! 4. Read strategies with `average_strategy` or build a
//!    [`StrategyReport`]
//!
//! # Example
//!
//! ```
//! use dudo_cfr::cfr::{PropagatingSolver, SolverConfig, Trainer};
//! use dudo_cfr::games::dudo::Dudo;
//!
//! let config = SolverConfig::new().with_sides(2).with_seed(42);
//! let mut solver: PropagatingSolver<Dudo> = PropagatingSolver::new(config).unwrap();
//! let stats = solver.train(1_000).unwrap();
//! println!("game value {:.3} over {} info sets", stats.game_value(), stats.info_sets);
//! ```
//!
//! # Theory
//!
//! **Regret**: how much better an action would have done than the
//! current strategy, weighted by the probability that the opponent (and
//! chance) let the game reach the node.
//! ```text
//! Regret(a) += Reach_opponent * (Value(a) - Value(current_strategy))
//! ```
//!
//! **Regret Matching**: strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! The average of the strategies played, weighted by the player's own
//! reach, converges to a Nash equilibrium in two-player zero-sum games.
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Neller, T., Hnath, S. "Approximating Optimal Dudo Play with Fixed-Strategy Iteration
//!   Counterfactual Regret Minimization" (2011)

pub mod config;
pub mod dice;
pub mod error;
pub mod graph;
pub mod node;
pub mod propagating;
pub mod recursive;
pub mod report;
pub mod storage;
pub mod trainer;

// Re-export main types for convenient access
pub use config::{
    check_info_set_budget, ConfigError, SolverConfig, TrainingStats, MAX_INFO_SETS, MAX_SIDES,
    MIN_SIDES,
};
pub use dice::{ReplayDice, RollSource, UniformDice};
pub use error::SolverError;
pub use graph::{GraphBuilder, Layering};
pub use node::{ActionRange, DecisionNode, SweepState};
pub use propagating::{Outcome, Phase, PropagatingSolver, SweepTrace, Topology, Visit};
pub use recursive::RecursiveSolver;
pub use report::{ReportMetadata, StrategyEntry, StrategyReport};
pub use storage::{NodeId, NodeStore};
pub use trainer::Trainer;
