//! Error types for the solvers.

use thiserror::Error;

use crate::cfr::config::ConfigError;

/// Errors that abort a training run.
///
/// Every variant except [`SolverError::Config`] means the accumulated
/// regrets can no longer be trusted, so training stops at the first one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// The solver configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Two nodes were created for the same information set key.
    #[error("information set {0} already has a node")]
    DuplicateNode(String),

    /// A key was looked up that no node was ever created for.
    #[error("no node for information set {0}")]
    MissingNode(String),

    /// A sweep touched a node out of depth order.
    #[error("{phase} sweep visited {node} out of order: {reason}")]
    OrderViolation {
        /// Sweep direction ("forward" or "backward").
        phase: &'static str,
        /// Label of the offending node.
        node: String,
        /// What went wrong.
        reason: &'static str,
    },

    /// A terminal was resolved in a state that cannot occur.
    #[error("invalid game state: {0}")]
    InvalidState(String),
}
