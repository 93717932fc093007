//! Two-pass propagating CFR.
//!
//! Instead of recursing through the tree, every node of the game is
//! created once up front and visited in two sweeps per iteration:
//!
//! 1. **Forward**, shallowest layer first: compute each node's current
//!    strategy and push reach probabilities to its successors.
//! 2. **Backward**, deepest layer first: read successor utilities, update
//!    regrets and record the node's own utility, then clear the reach
//!    accumulators for the next iteration.
//!
//! The game itself is described by a [`Topology`]. A topology enumerates
//! its nodes into a [`GraphBuilder`] and, for the dice of one iteration,
//! says which node a slot resolves to and where each action leads.
//!
//! Each node carries the iteration in which it was last processed in
//! either direction, so a sweep that reaches a node twice or finds a
//! successor in the wrong state reports a [`SolverError::OrderViolation`]
//! instead of silently corrupting regrets.

use std::fmt::Debug;
use std::hash::Hash;

use rand::rngs::StdRng;

use crate::cfr::config::{check_info_set_budget, SolverConfig, TrainingStats};
use crate::cfr::dice::{RollSource, UniformDice};
use crate::cfr::error::SolverError;
use crate::cfr::graph::{GraphBuilder, Layering};
use crate::cfr::report::StrategyReport;
use crate::cfr::storage::{NodeId, NodeStore};
use crate::cfr::trainer::Trainer;

/// Where an action leads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<K> {
    /// Another decision node.
    Continue {
        /// Key of the successor node.
        key: K,
        /// Whether the successor belongs to the other player. If so, reach
        /// contributions swap sides and the successor's utility is negated.
        alternates: bool,
    },
    /// The game ends with this utility for the player acting at the node.
    Terminal(f64),
}

/// A game laid out for propagating CFR.
pub trait Topology {
    /// Information set key.
    type Key: Copy + Eq + Hash + Ord + Debug;
    /// Position in the game independent of the dice.
    type Slot: Copy + Debug;
    /// Private information dealt for one iteration.
    type Deal;

    /// Build the topology for a validated configuration.
    fn from_config(config: &SolverConfig) -> Self
    where
        Self: Sized;

    /// Short name used in reports.
    fn name(&self) -> &'static str;

    /// Number of nodes [`Topology::enumerate`] creates.
    fn num_info_sets(&self) -> u64;

    /// Create every node and place every slot on its layer.
    fn enumerate(
        &self,
        builder: &mut GraphBuilder<Self::Key, Self::Slot>,
    ) -> Result<(), SolverError>;

    /// Deal the private dice of one iteration.
    fn deal<D: RollSource>(&self, dice: &mut D) -> Self::Deal;

    /// Node a slot resolves to under `deal`.
    fn node_key(&self, slot: Self::Slot, deal: &Self::Deal) -> Self::Key;

    /// Result of taking `action` at `slot` under `deal`.
    fn outcome(
        &self,
        slot: Self::Slot,
        deal: &Self::Deal,
        action: usize,
    ) -> Result<Outcome<Self::Key>, SolverError>;

    /// Display name of `action` at the node for `key`.
    fn action_name(&self, key: Self::Key, action: usize) -> String;
}

/// Direction of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reach propagation, shallowest layer first.
    Forward,
    /// Utility and regret propagation, deepest layer first.
    Backward,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Forward => "forward",
            Phase::Backward => "backward",
        }
    }
}

/// One node processed by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Sweep direction.
    pub phase: Phase,
    /// Layer of the node.
    pub depth: usize,
    /// The node.
    pub node: NodeId,
}

/// Every node processed during one iteration, in processing order.
#[derive(Debug, Clone, Default)]
pub struct SweepTrace {
    /// Forward visits followed by backward visits.
    pub visits: Vec<Visit>,
    /// Player 0's root utility for the iteration.
    pub utility: f64,
}

impl SweepTrace {
    /// Visits of one phase, in order.
    pub fn phase(&self, phase: Phase) -> impl Iterator<Item = &Visit> + '_ {
        self.visits.iter().filter(move |v| v.phase == phase)
    }
}

/// Propagating CFR solver over a [`Topology`].
pub struct PropagatingSolver<T: Topology, D = UniformDice<StdRng>> {
    topology: T,
    config: SolverConfig,
    store: NodeStore<T::Key>,
    layering: Layering<T::Slot>,
    dice: D,
    scratch: Vec<f64>,
    iteration: u64,
    stats: TrainingStats,
}

impl<T: Topology> PropagatingSolver<T> {
    /// Create a solver rolling seeded (or entropy-seeded) uniform dice.
    pub fn new(config: SolverConfig) -> Result<Self, SolverError> {
        let dice = UniformDice::from_seed(config.seed);
        Self::with_dice(config, dice)
    }
}

impl<T: Topology, D: RollSource> PropagatingSolver<T, D> {
    /// Create a solver with an explicit roll source.
    ///
    /// Every node is created here; training never allocates nodes.
    pub fn with_dice(config: SolverConfig, dice: D) -> Result<Self, SolverError> {
        config.validate()?;
        let topology = T::from_config(&config);
        let count = topology.num_info_sets();
        check_info_set_budget(count)?;

        let mut builder = GraphBuilder::with_capacity(count as usize);
        topology.enumerate(&mut builder)?;
        let (store, layering) = builder.finish();

        log::debug!(
            "{} d{}: {} nodes over {} layers ({} slots)",
            topology.name(),
            config.sides,
            store.len(),
            layering.depth(),
            layering.num_slots()
        );

        Ok(Self {
            topology,
            config,
            store,
            layering,
            dice,
            scratch: Vec::new(),
            iteration: 0,
            stats: TrainingStats::new(),
        })
    }

    /// The game being solved.
    pub fn topology(&self) -> &T {
        &self.topology
    }

    /// All decision nodes.
    pub fn store(&self) -> &NodeStore<T::Key> {
        &self.store
    }

    /// Sweep order of the slots.
    pub fn layering(&self) -> &Layering<T::Slot> {
        &self.layering
    }

    /// Average strategy at the node for `key`.
    pub fn average_strategy(&self, key: &T::Key) -> Option<Vec<f64>> {
        self.store.by_key(key).map(|node| node.average_strategy())
    }

    /// Average strategies of every node.
    pub fn report(&self) -> StrategyReport {
        let topology = &self.topology;
        StrategyReport::from_store(
            topology.name(),
            &self.config,
            &self.stats,
            &self.store,
            |key, action| topology.action_name(key, action),
        )
    }

    /// Run one iteration, recording the order in which nodes were visited.
    ///
    /// The iteration counts like any other: its utility goes into the
    /// training statistics.
    pub fn trace_iteration(&mut self) -> Result<SweepTrace, SolverError> {
        let mut trace = SweepTrace::default();
        trace.utility = self.sweep(Some(&mut trace))?;
        self.stats.utility_sum += trace.utility;
        self.stats.iterations = self.iteration;
        Ok(trace)
    }

    fn sweep(&mut self, mut trace: Option<&mut SweepTrace>) -> Result<f64, SolverError> {
        self.iteration += 1;
        let stamp = self.iteration;
        let deal = self.topology.deal(&mut self.dice);
        let root_slot = *self
            .layering
            .layer(0)
            .first()
            .ok_or_else(|| SolverError::InvalidState("topology has no root".to_string()))?;

        for &slot in self.layering.layer(0) {
            let id = self.store.require(&self.topology.node_key(slot, &deal))?;
            let state = self.store.node_mut(id).sweep_mut();
            state.reach_player = 1.0;
            state.reach_opponent = 1.0;
        }

        for (depth, layer) in self.layering.iter() {
            for &slot in layer {
                let id = self.store.require(&self.topology.node_key(slot, &deal))?;
                forward_visit(&self.topology, &mut self.store, id, slot, &deal, stamp)?;
                if let Some(trace) = trace.as_deref_mut() {
                    trace.visits.push(Visit { phase: Phase::Forward, depth, node: id });
                }
            }
        }

        for (depth, layer) in self.layering.iter().rev() {
            for &slot in layer {
                let id = self.store.require(&self.topology.node_key(slot, &deal))?;
                backward_visit(
                    &self.topology,
                    &mut self.store,
                    &mut self.scratch,
                    id,
                    slot,
                    &deal,
                    stamp,
                )?;
                if let Some(trace) = trace.as_deref_mut() {
                    trace.visits.push(Visit { phase: Phase::Backward, depth, node: id });
                }
            }
        }

        let root = self.store.require(&self.topology.node_key(root_slot, &deal))?;
        Ok(self.store.node(root).sweep().utility)
    }
}

fn order_violation<K: Copy + Eq + Hash + Debug>(
    store: &NodeStore<K>,
    phase: Phase,
    id: NodeId,
    reason: &'static str,
) -> SolverError {
    SolverError::OrderViolation {
        phase: phase.as_str(),
        node: store.node(id).label().to_string(),
        reason,
    }
}

fn forward_visit<T: Topology>(
    topology: &T,
    store: &mut NodeStore<T::Key>,
    id: NodeId,
    slot: T::Slot,
    deal: &T::Deal,
    stamp: u64,
) -> Result<(), SolverError> {
    let node = store.node_mut(id);
    if node.sweep().forward_stamp == stamp {
        return Err(order_violation(store, Phase::Forward, id, "node visited twice"));
    }
    node.sweep_mut().forward_stamp = stamp;
    let reach_player = node.sweep().reach_player;
    let reach_opponent = node.sweep().reach_opponent;
    let actions = node.actions();
    node.current_strategy(reach_player);

    for (i, action) in actions.iter().enumerate() {
        let (key, alternates) = match topology.outcome(slot, deal, action)? {
            Outcome::Terminal(_) => continue,
            Outcome::Continue { key, alternates } => (key, alternates),
        };
        let p = store.node(id).strategy()[i];
        let next = store.require(&key)?;
        if store.node(next).sweep().forward_stamp == stamp {
            return Err(order_violation(
                store,
                Phase::Forward,
                next,
                "reach pushed after the node was processed",
            ));
        }
        let succ = store.node_mut(next).sweep_mut();
        if alternates {
            succ.reach_player += reach_opponent;
            succ.reach_opponent += p * reach_player;
        } else {
            succ.reach_player += p * reach_player;
            succ.reach_opponent += reach_opponent;
        }
    }
    Ok(())
}

fn backward_visit<T: Topology>(
    topology: &T,
    store: &mut NodeStore<T::Key>,
    utilities: &mut Vec<f64>,
    id: NodeId,
    slot: T::Slot,
    deal: &T::Deal,
    stamp: u64,
) -> Result<(), SolverError> {
    if store.node(id).sweep().backward_stamp == stamp {
        return Err(order_violation(store, Phase::Backward, id, "node visited twice"));
    }

    utilities.clear();
    for action in store.node(id).actions().iter() {
        let utility = match topology.outcome(slot, deal, action)? {
            Outcome::Terminal(payoff) => payoff,
            Outcome::Continue { key, alternates } => {
                let next = store.require(&key)?;
                let succ = store.node(next).sweep();
                if succ.backward_stamp != stamp {
                    return Err(order_violation(
                        store,
                        Phase::Backward,
                        next,
                        "utility read before the node was finalized",
                    ));
                }
                if alternates {
                    -succ.utility
                } else {
                    succ.utility
                }
            }
        };
        utilities.push(utility);
    }

    let node = store.node_mut(id);
    let node_utility: f64 = node
        .strategy()
        .iter()
        .zip(utilities.iter())
        .map(|(s, u)| s * u)
        .sum();
    let weight = node.sweep().reach_opponent;
    node.accumulate_regret(utilities, node_utility, weight);

    let state = node.sweep_mut();
    state.utility = node_utility;
    state.reach_player = 0.0;
    state.reach_opponent = 0.0;
    state.backward_stamp = stamp;
    Ok(())
}

impl<T: Topology, D: RollSource> Trainer for PropagatingSolver<T, D> {
    fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn iteration(&self) -> u64 {
        self.iteration
    }

    fn num_info_sets(&self) -> usize {
        self.store.len()
    }

    fn memory_usage(&self) -> usize {
        self.store.memory_usage()
    }

    fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut TrainingStats {
        &mut self.stats
    }

    fn run_iteration(&mut self) -> Result<f64, SolverError> {
        self.sweep(None)
    }

    fn discard_strategy_sums(&mut self) {
        self.store.reset_strategy_sums();
    }
}
