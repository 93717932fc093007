//! Game implementations for the CFR solvers.
//!
//! ## Available Games
//!
//! - [`dudo`]: One die per player, claims of count and face with 1s wild.
//!   Solvable by both the recursive and the propagating solver.
//! - [`liars_die`]: A single die passed between players who must keep
//!   raising the claim. Solvable by the propagating solver.
//!
//! ## Adding New Games
//!
//! 1. Create a new module under `src/games/`
//! 2. Define the information set key and the dice-independent slot type
//! 3. Implement [`Topology`](crate::cfr::Topology), placing each slot on a
//!    layer deeper than every slot that leads to it and reporting how
//!    many nodes it creates
//! 4. Add tests that pin down the rules and the enumeration

pub mod dudo;
pub mod liars_die;
