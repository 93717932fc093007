//! Storage for decision nodes.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Solvers hold ids
//! across recursive calls and sweeps instead of references, so inserting a
//! new node never invalidates a node that is still being worked on.

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::cfr::error::SolverError;
use crate::cfr::node::DecisionNode;

/// Stable index of a node inside a [`NodeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in insertion order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Owner of every decision node of a training run.
///
/// Keys are unique: inserting a key twice is reported as a collision.
#[derive(Debug, Clone)]
pub struct NodeStore<K> {
    nodes: Vec<DecisionNode>,
    keys: Vec<K>,
    index: FxHashMap<K, NodeId>,
}

impl<K: Copy + Eq + Hash + Debug> Default for NodeStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash + Debug> NodeStore<K> {
    /// Create new empty storage.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            keys: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Create storage with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            keys: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Insert a node under a fresh key.
    pub fn insert(&mut self, key: K, node: DecisionNode) -> Result<NodeId, SolverError> {
        if self.index.contains_key(&key) {
            return Err(SolverError::DuplicateNode(format!("{:?}", key)));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.keys.push(key);
        self.index.insert(key, id);
        Ok(id)
    }

    /// Look up the node for `key`, creating it with `make` on first visit.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> NodeId
    where
        F: FnOnce() -> DecisionNode,
    {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(make());
        self.keys.push(key);
        self.index.insert(key, id);
        id
    }

    /// Id of the node for `key`, if one exists.
    pub fn get(&self, key: &K) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Id of the node for `key`; a missing node is an invariant violation.
    pub fn require(&self, key: &K) -> Result<NodeId, SolverError> {
        self.get(key)
            .ok_or_else(|| SolverError::MissingNode(format!("{:?}", key)))
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> &DecisionNode {
        &self.nodes[id.0]
    }

    /// Mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> &mut DecisionNode {
        &mut self.nodes[id.0]
    }

    /// Key the node was stored under.
    pub fn key(&self, id: NodeId) -> K {
        self.keys[id.0]
    }

    /// Node for `key`, if one exists.
    pub fn by_key(&self, key: &K) -> Option<&DecisionNode> {
        self.get(key).map(|id| self.node(id))
    }

    /// Check if an info set exists in storage.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Get the number of information sets stored.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been created yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their keys, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &DecisionNode)> + '_ {
        self.keys.iter().copied().zip(self.nodes.iter())
    }

    /// Reset every strategy sum to zero, keeping regrets.
    pub fn reset_strategy_sums(&mut self) {
        for node in &mut self.nodes {
            node.reset_strategy_sum();
        }
    }

    /// Get total memory usage estimate in bytes.
    pub fn memory_usage(&self) -> usize {
        let floats: usize = self.nodes.iter().map(|n| 3 * n.num_actions()).sum();
        floats * std::mem::size_of::<f64>()
            + self.nodes.len() * (std::mem::size_of::<DecisionNode>() + std::mem::size_of::<K>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::node::ActionRange;

    #[test]
    fn test_insert_and_lookup() {
        let mut store: NodeStore<u64> = NodeStore::new();
        assert!(store.is_empty());

        let a = store.insert(7, DecisionNode::new("a", ActionRange::new(0, 1))).unwrap();
        let b = store.insert(9, DecisionNode::new("b", ActionRange::new(1, 3))).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&7), Some(a));
        assert_eq!(store.key(b), 9);
        assert_eq!(store.node(b).label(), "b");
        assert!(store.contains(&9));
        assert!(store.by_key(&8).is_none());
    }

    #[test]
    fn test_duplicate_key_is_collision() {
        let mut store: NodeStore<u64> = NodeStore::new();
        store.insert(1, DecisionNode::new("a", ActionRange::new(0, 1))).unwrap();
        let err = store
            .insert(1, DecisionNode::new("b", ActionRange::new(0, 1)))
            .unwrap_err();
        assert_eq!(err, SolverError::DuplicateNode("1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_require_missing() {
        let store: NodeStore<u64> = NodeStore::new();
        assert_eq!(store.require(&3), Err(SolverError::MissingNode("3".to_string())));
    }

    #[test]
    fn test_get_or_insert_is_lazy() {
        let mut store: NodeStore<u64> = NodeStore::with_capacity(4);
        let first = store.get_or_insert_with(5, || DecisionNode::new("a", ActionRange::new(0, 0)));
        let again = store.get_or_insert_with(5, || panic!("node already exists"));
        assert_eq!(first, again);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reset_strategy_sums() {
        let mut store: NodeStore<u64> = NodeStore::new();
        let id = store.insert(1, DecisionNode::new("a", ActionRange::new(0, 1))).unwrap();
        store.node_mut(id).accumulate_regret(&[1.0, 0.0], 0.0, 1.0);
        store.node_mut(id).current_strategy(1.0);
        store.reset_strategy_sums();
        assert_eq!(store.node(id).strategy_sum(), &[0.0, 0.0]);
        assert_eq!(store.node(id).regret_sum(), &[1.0, 0.0]);
        assert!(store.memory_usage() > 0);
    }
}
