//! # Dudo CFR
//!
//! Counterfactual Regret Minimization solvers for two-player dice bluffing
//! games: one-die-each Dudo and Liar's Die.
//!
//! ## Features
//!
//! - **Recursive CFR**: Depth-first traversal with lazily created nodes
//! - **Propagating CFR**: Pre-built node graph swept forward and backward,
//!   with depth-order checks on every visit
//! - **Bounded claims**: Optionally force a challenge after a fixed number
//!   of claims
//! - **Warm-start discard**: Reset strategy sums part way through training
//! - **Reports**: Average strategies as text or JSON
//!
//! ## Quick Start
//!
//! ```
//! use dudo_cfr::{RecursiveSolver, SolverConfig, Trainer};
//!
//! let config = SolverConfig::new().with_sides(2).with_seed(7);
//! let mut solver = RecursiveSolver::new(config).unwrap();
//! solver.train(1_000).unwrap();
//! println!("{}", solver.report());
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Nodes, storage, both solvers and the training loop
//! - [`games`]: Dudo and Liar's Die rules
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  Trainer (train, discard)                    │
//! └──────────────────────────────────────────────────────────────┘
//!                 │                              │
//!                 ▼                              ▼
//!        ┌─────────────────┐          ┌──────────────────────┐
//!        │ RecursiveSolver │          │  PropagatingSolver   │
//!        │     (Dudo)      │          │  (any Topology)      │
//!        └─────────────────┘          └──────────────────────┘
//!                 │                      │               │
//!                 ▼                      ▼               ▼
//!        ┌──────────────────────────────────┐   ┌──────────────┐
//!        │   Dudo (rules, info set keys)    │   │  Liar's Die  │
//!        └──────────────────────────────────┘   └──────────────┘
//! ```

#![warn(missing_docs)]

/// CFR (Counterfactual Regret Minimization) solver module.
///
/// Nodes, node storage, the recursive and propagating solvers and the
/// shared training loop.
pub mod cfr;

/// Game implementations module.
///
/// Rules, information set keys and sweep layouts for each game.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{
    PropagatingSolver, RecursiveSolver, SolverConfig, SolverError, StrategyReport, Trainer,
    TrainingStats,
};
