//! Ahead-of-time node enumeration for the propagating solver.
//!
//! A [`GraphBuilder`] collects two things while a topology enumerates its
//! game: every decision node (one per reachable key) and the
//! [`Layering`], the depth-sorted list of slots the sweeps walk. A slot is
//! a position in the game that does not depend on the dice (a Dudo claim
//! history, say); each iteration resolves it to a node using the rolls.

use std::fmt::Debug;
use std::hash::Hash;

use crate::cfr::error::SolverError;
use crate::cfr::node::DecisionNode;
use crate::cfr::storage::{NodeId, NodeStore};

/// Slots grouped by depth, in sweep order.
///
/// The forward sweep walks layers `0, 1, ..` and the backward sweep walks
/// them in reverse. Every successor of a slot must lie on a deeper layer.
#[derive(Debug, Clone)]
pub struct Layering<S> {
    layers: Vec<Vec<S>>,
}

impl<S: Copy> Layering<S> {
    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Slots at `depth`.
    pub fn layer(&self, depth: usize) -> &[S] {
        &self.layers[depth]
    }

    /// Total number of slots.
    pub fn num_slots(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Layers with their depth, shallowest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &[S])> + '_ {
        self.layers.iter().enumerate().map(|(d, l)| (d, l.as_slice()))
    }
}

/// Collects nodes and slots while a topology is enumerated.
#[derive(Debug)]
pub struct GraphBuilder<K, S> {
    store: NodeStore<K>,
    layers: Vec<Vec<S>>,
}

impl<K: Copy + Eq + Hash + Debug, S: Copy> Default for GraphBuilder<K, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash + Debug, S: Copy> GraphBuilder<K, S> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            store: NodeStore::new(),
            layers: Vec::new(),
        }
    }

    /// Create a builder with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: NodeStore::with_capacity(capacity),
            layers: Vec::new(),
        }
    }

    /// Create a node. A key seen before is a collision.
    pub fn add_node(&mut self, key: K, node: DecisionNode) -> Result<NodeId, SolverError> {
        self.store.insert(key, node)
    }

    /// Append a slot to the layer at `depth`.
    pub fn add_slot(&mut self, depth: usize, slot: S) {
        if self.layers.len() <= depth {
            self.layers.resize_with(depth + 1, Vec::new);
        }
        self.layers[depth].push(slot);
    }

    /// Number of nodes created so far.
    pub fn num_nodes(&self) -> usize {
        self.store.len()
    }

    /// Finish enumeration.
    pub fn finish(self) -> (NodeStore<K>, Layering<S>) {
        (self.store, Layering { layers: self.layers })
    }
}
