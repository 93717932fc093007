//! Recursive CFR for Dudo.
//!
//! Each iteration deals both dice and walks the claim tree depth first,
//! creating nodes the first time an information set is reached. Utilities
//! are returned from the perspective of the player to act at each call, so
//! a child's result is negated on the way up.

use rand::rngs::StdRng;

use crate::cfr::config::{check_info_set_budget, SolverConfig, TrainingStats};
use crate::cfr::dice::{RollSource, UniformDice};
use crate::cfr::error::SolverError;
use crate::cfr::node::DecisionNode;
use crate::cfr::report::StrategyReport;
use crate::cfr::storage::NodeStore;
use crate::cfr::trainer::Trainer;
use crate::games::dudo::{ClaimHistory, Dudo, InfoSetKey};

/// Vanilla recursive CFR solver for Dudo.
///
/// # Example
/// ```
/// use dudo_cfr::cfr::{RecursiveSolver, SolverConfig, Trainer};
///
/// let config = SolverConfig::new().with_sides(2).with_seed(1);
/// let mut solver = RecursiveSolver::new(config).unwrap();
/// solver.train(100).unwrap();
/// assert_eq!(solver.num_info_sets(), 32);
/// ```
pub struct RecursiveSolver<D = UniformDice<StdRng>> {
    game: Dudo,
    config: SolverConfig,
    store: NodeStore<InfoSetKey>,
    dice: D,
    iteration: u64,
    stats: TrainingStats,
}

impl RecursiveSolver {
    /// Create a solver rolling seeded (or entropy-seeded) uniform dice.
    pub fn new(config: SolverConfig) -> Result<Self, SolverError> {
        let dice = UniformDice::from_seed(config.seed);
        Self::with_dice(config, dice)
    }
}

impl<D: RollSource> RecursiveSolver<D> {
    /// Create a solver with an explicit roll source.
    pub fn with_dice(config: SolverConfig, dice: D) -> Result<Self, SolverError> {
        config.validate()?;
        let game = Dudo::from_config(&config);
        check_info_set_budget(game.num_info_sets())?;
        Ok(Self {
            game,
            config,
            store: NodeStore::new(),
            dice,
            iteration: 0,
            stats: TrainingStats::new(),
        })
    }

    /// The game being solved.
    pub fn game(&self) -> &Dudo {
        &self.game
    }

    /// Nodes created so far.
    pub fn store(&self) -> &NodeStore<InfoSetKey> {
        &self.store
    }

    /// Average strategy of a player holding `roll` after `history`, if
    /// that information set has been reached.
    pub fn average_strategy(&self, roll: u8, history: ClaimHistory) -> Option<Vec<f64>> {
        let key = self.game.indexer().encode(roll, history);
        self.store.by_key(&key).map(|node| node.average_strategy())
    }

    /// Average strategies of every node reached so far.
    pub fn report(&self) -> StrategyReport {
        let game = &self.game;
        StrategyReport::from_store("dudo", &self.config, &self.stats, &self.store, |_, a| {
            game.action_name(a)
        })
    }

    /// Returns the utility for the player to act after `history`.
    ///
    /// `last` is the action that led here; a challenge ends the game and
    /// pays the claimant, who is the player to act at this call.
    fn cfr(
        &mut self,
        rolls: [u8; 2],
        history: ClaimHistory,
        reach: [f64; 2],
        last: Option<usize>,
    ) -> Result<f64, SolverError> {
        let challenge = self.game.challenge();
        if last == Some(challenge) {
            let claim = history.last().ok_or_else(|| {
                SolverError::InvalidState("challenge before any claim".to_string())
            })?;
            return Ok(self.game.claimant_payoff(rolls, claim));
        }

        let player = self.game.player_to_act(history);
        let roll = rolls[player];
        let key = self.game.indexer().encode(roll, history);
        let game = &self.game;
        let id = self.store.get_or_insert_with(key, || {
            DecisionNode::new(game.label(roll, history), game.legal_actions(history))
        });

        let node = self.store.node_mut(id);
        let actions = node.actions();
        let strategy = node.current_strategy(reach[player]).to_vec();

        let mut utilities = vec![0.0; actions.len()];
        for (i, action) in actions.iter().enumerate() {
            let next = if action == challenge {
                history
            } else {
                history.with(action)
            };
            let mut next_reach = reach;
            next_reach[player] *= strategy[i];
            utilities[i] = -self.cfr(rolls, next, next_reach, Some(action))?;
        }

        let node_utility: f64 = strategy.iter().zip(&utilities).map(|(s, u)| s * u).sum();
        self.store
            .node_mut(id)
            .accumulate_regret(&utilities, node_utility, reach[1 - player]);

        Ok(node_utility)
    }
}

impl<D: RollSource> Trainer for RecursiveSolver<D> {
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
        self.iteration += 1;
        let first = self.dice.roll(self.game.sides());
        let second = self.dice.roll(self.game.sides());
        self.cfr([first, second], ClaimHistory::EMPTY, [1.0, 1.0], None)
    }

    fn discard_strategy_sums(&mut self) {
        self.store.reset_strategy_sums();
    }
}
