//! Dudo laid out for the propagating solver.
//!
//! Slots are claim histories and live on the layer equal to their number
//! of claims. Every history gets one node per possible roll of the player
//! to act, so the whole game is allocated before training starts.

use super::{ClaimHistory, Dudo, InfoSetKey};
use crate::cfr::config::SolverConfig;
use crate::cfr::dice::RollSource;
use crate::cfr::error::SolverError;
use crate::cfr::graph::GraphBuilder;
use crate::cfr::node::DecisionNode;
use crate::cfr::propagating::{Outcome, Topology};

/// Both players' rolls for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DudoDeal {
    /// Roll of player 0 and player 1.
    pub rolls: [u8; 2],
}

impl Topology for Dudo {
    type Key = InfoSetKey;
    type Slot = ClaimHistory;
    type Deal = DudoDeal;

    fn from_config(config: &SolverConfig) -> Self {
        Dudo::from_config(config)
    }

    fn name(&self) -> &'static str {
        "dudo"
    }

    fn num_info_sets(&self) -> u64 {
        Dudo::num_info_sets(self)
    }

    fn enumerate(
        &self,
        builder: &mut GraphBuilder<InfoSetKey, ClaimHistory>,
    ) -> Result<(), SolverError> {
        let challenge = self.challenge();
        let mut frontier = vec![ClaimHistory::EMPTY];

        // A child extends its parent by a claim above the parent's last, so
        // each history is generated exactly once.
        for depth in 0..=self.claim_depth() {
            let mut next = Vec::new();
            for &history in &frontier {
                builder.add_slot(depth, history);
                let actions = self.legal_actions(history);
                for roll in 1..=self.sides() {
                    builder.add_node(
                        self.indexer().encode(roll, history),
                        DecisionNode::new(self.label(roll, history), actions),
                    )?;
                }
                next.extend(actions.iter().filter(|&a| a != challenge).map(|a| history.with(a)));
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        log::trace!("enumerated {} dudo nodes", builder.num_nodes());
        Ok(())
    }

    fn deal<D: RollSource>(&self, dice: &mut D) -> DudoDeal {
        let first = dice.roll(self.sides());
        let second = dice.roll(self.sides());
        DudoDeal { rolls: [first, second] }
    }

    fn node_key(&self, history: ClaimHistory, deal: &DudoDeal) -> InfoSetKey {
        let roll = deal.rolls[self.player_to_act(history)];
        self.indexer().encode(roll, history)
    }

    fn outcome(
        &self,
        history: ClaimHistory,
        deal: &DudoDeal,
        action: usize,
    ) -> Result<Outcome<InfoSetKey>, SolverError> {
        if action != self.challenge() {
            let next = history.with(action);
            return Ok(Outcome::Continue {
                key: self.node_key(next, deal),
                alternates: true,
            });
        }
        let claim = history.last().ok_or_else(|| {
            SolverError::InvalidState("challenge before any claim".to_string())
        })?;
        Ok(Outcome::Terminal(-self.claimant_payoff(deal.rolls, claim)))
    }

    fn action_name(&self, _key: InfoSetKey, action: usize) -> String {
        Dudo::action_name(self, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::dice::{ReplayDice, UniformDice};
    use crate::cfr::propagating::{Phase, PropagatingSolver};
    use crate::cfr::recursive::RecursiveSolver;
    use crate::cfr::trainer::Trainer;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn count_nodes(game: &Dudo) -> (usize, usize) {
        let mut builder = GraphBuilder::new();
        game.enumerate(&mut builder).unwrap();
        let (store, layering) = builder.finish();
        assert_eq!(Topology::num_info_sets(game), store.len() as u64);
        (store.len(), layering.depth())
    }

    #[test]
    fn test_full_game_node_count() {
        // Every subset of the four claims is a reachable history.
        assert_eq!(count_nodes(&Dudo::new(2)), (2 * 16, 5));
        assert_eq!(count_nodes(&Dudo::new(3)).0, 3 * 64);
    }

    #[test]
    fn test_bounded_node_count() {
        // Histories of at most two claims out of four: 1 + 4 + 6.
        assert_eq!(count_nodes(&Dudo::with_claim_depth(2, 2)), (2 * 11, 3));
        assert_eq!(count_nodes(&Dudo::with_claim_depth(4, 3)).0, 4 * (1 + 8 + 28 + 56));
    }

    #[test]
    fn test_info_set_counts_for_large_dice() {
        assert_eq!(Dudo::new(6).num_info_sets(), 6 * 4096);
        assert_eq!(Dudo::new(12).num_info_sets(), 12 << 24);
        // 1 + 24 + 276 histories of at most two claims.
        assert_eq!(Dudo::with_claim_depth(12, 2).num_info_sets(), 12 * 301);
    }

    #[test]
    fn test_node_key_follows_player() {
        let game = Dudo::new(6);
        let deal = game.deal(&mut ReplayDice::new(vec![3, 5]));
        assert_eq!(deal.rolls, [3, 5]);

        let opening = game.node_key(ClaimHistory::EMPTY, &deal);
        assert_eq!(game.indexer().decode(opening).0, 3);
        let reply = game.node_key(ClaimHistory::EMPTY.with(2), &deal);
        assert_eq!(game.indexer().decode(reply).0, 5);
    }

    #[test]
    fn test_challenge_outcome() {
        let game = Dudo::new(6);
        let deal = DudoDeal { rolls: [2, 1] };
        // Player 1 challenges player 0's 2*2 and loses.
        let history = ClaimHistory::EMPTY.with(6);
        assert_eq!(game.outcome(history, &deal, 12).unwrap(), Outcome::Terminal(-1.0));
        assert!(matches!(
            game.outcome(history, &deal, 7).unwrap(),
            Outcome::Continue { alternates: true, .. }
        ));
        assert!(game.outcome(ClaimHistory::EMPTY, &deal, 12).is_err());
    }

    fn random_rolls(sides: u8, count: usize, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count).map(|_| rng.gen_range(1..=sides)).collect()
    }

    fn assert_solvers_agree(config: SolverConfig, iterations: u64) {
        let rolls = random_rolls(config.sides, 2 * iterations as usize, 17);
        let mut recursive =
            RecursiveSolver::with_dice(config.clone(), ReplayDice::new(rolls.clone())).unwrap();
        let mut propagating: PropagatingSolver<Dudo, ReplayDice> =
            PropagatingSolver::with_dice(config, ReplayDice::new(rolls)).unwrap();

        for i in 0..iterations {
            let a = recursive.run_iteration().unwrap();
            let b = propagating.run_iteration().unwrap();
            assert!((a - b).abs() < 1e-9, "iteration {}: root {} vs {}", i, a, b);
        }

        for (key, node) in recursive.store().iter() {
            let other = propagating.store().by_key(&key).unwrap();
            assert_eq!(node.actions(), other.actions(), "{}", node.label());
            for (x, y) in node.regret_sum().iter().zip(other.regret_sum()) {
                assert!((x - y).abs() < 1e-9, "{} regret {} vs {}", node.label(), x, y);
            }
            for (x, y) in node.strategy_sum().iter().zip(other.strategy_sum()) {
                assert!((x - y).abs() < 1e-9, "{} strategy sum {} vs {}", node.label(), x, y);
            }
        }
    }

    #[test]
    fn test_solvers_agree_on_full_game() {
        assert_solvers_agree(SolverConfig::new().with_sides(2), 300);
        assert_solvers_agree(SolverConfig::new().with_sides(3), 100);
    }

    #[test]
    fn test_solvers_agree_on_bounded_game() {
        assert_solvers_agree(SolverConfig::new().with_sides(3).with_claim_depth(2), 200);
    }

    #[test]
    fn test_sweep_visits_in_depth_order() {
        let config = SolverConfig::new().with_sides(2).with_claim_depth(2);
        let mut solver: PropagatingSolver<Dudo, ReplayDice> =
            PropagatingSolver::with_dice(config, ReplayDice::new(vec![1, 2])).unwrap();

        for iteration in 1..=3u64 {
            let trace = solver.trace_iteration().unwrap();
            let forward: Vec<_> = trace.phase(Phase::Forward).collect();
            let backward: Vec<_> = trace.phase(Phase::Backward).collect();

            // One node per history of at most two claims.
            assert_eq!(forward.len(), 11);
            assert_eq!(backward.len(), 11);
            assert!(forward.windows(2).all(|w| w[0].depth <= w[1].depth));
            assert!(backward.windows(2).all(|w| w[0].depth >= w[1].depth));
            assert_eq!(forward.first().map(|v| v.depth), Some(0));
            assert_eq!(backward.last().map(|v| v.depth), Some(0));

            let forward_nodes: HashSet<_> = forward.iter().map(|v| v.node).collect();
            let backward_nodes: HashSet<_> = backward.iter().map(|v| v.node).collect();
            assert_eq!(forward_nodes.len(), 11, "a node was visited twice");
            assert_eq!(forward_nodes, backward_nodes);

            for id in forward_nodes {
                let state = solver.store().node(id).sweep();
                assert_eq!(state.forward_stamp, iteration);
                assert_eq!(state.backward_stamp, iteration);
            }
        }
    }

    #[test]
    fn test_discard_keeps_regrets() {
        let config = SolverConfig::new().with_sides(2).with_seed(5);
        let mut plain: PropagatingSolver<Dudo> = PropagatingSolver::new(config.clone()).unwrap();
        let mut discarding: PropagatingSolver<Dudo> =
            PropagatingSolver::new(config.with_discard_fraction(1.0)).unwrap();

        plain.train(500).unwrap();
        let stats = discarding.train(500).unwrap();
        assert_eq!(stats.discarded_at, Some(500));

        for ((_, a), (_, b)) in plain.store().iter().zip(discarding.store().iter()) {
            assert_eq!(a.regret_sum(), b.regret_sum());
            assert!(b.strategy_sum().iter().all(|&x| x == 0.0));
        }
        assert!(plain
            .store()
            .iter()
            .any(|(_, n)| n.strategy_sum().iter().any(|&x| x > 0.0)));
    }

    #[test]
    fn test_discard_restarts_average() {
        // Discarding after the first half leaves only second-half weight.
        let config = SolverConfig::new()
            .with_sides(2)
            .with_seed(8)
            .with_discard_fraction(0.5);
        let mut solver: PropagatingSolver<Dudo> = PropagatingSolver::new(config).unwrap();
        let stats = solver.train(400).unwrap();
        assert_eq!(stats.discarded_at, Some(200));

        let root = solver.store().by_key(&solver.topology().indexer().encode(
            1,
            ClaimHistory::EMPTY,
        ));
        let total: f64 = root.unwrap().strategy_sum().iter().sum();
        // The opener's reach is 1 whenever it holds a 1, so the sum counts
        // second-half iterations with that roll.
        assert!(total > 0.0 && total <= 200.0, "total weight {}", total);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = SolverConfig::new().with_sides(3).with_seed(21);
        let mut a: PropagatingSolver<Dudo, UniformDice<StdRng>> =
            PropagatingSolver::new(config.clone()).unwrap();
        let mut b: PropagatingSolver<Dudo> = PropagatingSolver::new(config).unwrap();
        a.train(200).unwrap();
        b.train(200).unwrap();
        assert_eq!(a.stats().utility_sum, b.stats().utility_sum);
        for ((_, x), (_, y)) in a.store().iter().zip(b.store().iter()) {
            assert_eq!(x.regret_sum(), y.regret_sum());
        }
    }
}
