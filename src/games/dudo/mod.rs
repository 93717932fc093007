//! Two-player, one-die-each Dudo.
//!
//! Each player rolls one die of `S` sides in secret. Players alternately
//! make strictly increasing claims about how many dice show a face, where
//! a 1 is wild and counts toward every face. Instead of claiming, a player
//! may call "Dudo" to challenge the last claim; the game then ends and the
//! claimant wins if the claim holds.
//!
//! # Claim encoding
//!
//! With two dice there are `2 * S` claims, ordered by strength. Claim `i`
//! asserts `i / S + 1` dice of face `i % S + 2`, except that the last face
//! of each count is the wild 1, which outranks every other face:
//!
//! ```text
//! d2: 0 = 1*2, 1 = 1*1, 2 = 2*2, 3 = 2*1, 4 = Dudo
//! ```
//!
//! The challenge is action `2 * S`. The set of claims made so far fits in
//! a bitmask, and since claims only increase the mask determines the
//! order they were made in.

mod info_set;
mod topology;

pub use info_set::{InfoSetIndexer, InfoSetKey};
pub use topology::DudoDeal;

use std::fmt;

use crate::cfr::config::SolverConfig;
use crate::cfr::node::ActionRange;

/// Display name of the challenge action.
pub const DUDO: &str = "Dudo";

/// A claim of at least `count` dice showing `face`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    /// Number of dice claimed.
    pub count: u8,
    /// Face claimed; 1 is wild.
    pub face: u8,
}

impl Claim {
    /// Decode claim index `index` for a die with `sides` faces.
    pub fn from_index(index: usize, sides: u8) -> Self {
        let s = sides as usize;
        debug_assert!(index < 2 * s, "claim {} on a d{}", index, sides);
        let rank = index % s;
        let face = if rank == s - 1 { 1 } else { rank as u8 + 2 };
        Self {
            count: (index / s + 1) as u8,
            face,
        }
    }

    /// Number of the two dice that satisfy this claim's face.
    pub fn matching(&self, rolls: [u8; 2]) -> u8 {
        rolls
            .iter()
            .filter(|&&r| r == 1 || r == self.face)
            .count() as u8
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*{}", self.count, self.face)
    }
}

/// The set of claims made so far, one bit per claim index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ClaimHistory(u32);

impl ClaimHistory {
    /// No claim made yet.
    pub const EMPTY: ClaimHistory = ClaimHistory(0);

    /// History from its raw bitmask.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bitmask.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// History after one more claim.
    pub fn with(self, claim: usize) -> Self {
        debug_assert!(claim < 32);
        Self(self.0 | 1 << claim)
    }

    /// Whether `claim` has been made.
    pub fn contains(self, claim: usize) -> bool {
        claim < 32 && self.0 & (1 << claim) != 0
    }

    /// Number of claims made.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether no claim has been made.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Most recent (and strongest) claim.
    pub fn last(self) -> Option<usize> {
        (self.0 != 0).then(|| 31 - self.0.leading_zeros() as usize)
    }

    /// Claims in the order they were made.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..32).filter(move |&c| self.contains(c))
    }
}

/// Rules of Dudo for a given die, optionally with a bounded claim sequence.
#[derive(Debug, Clone)]
pub struct Dudo {
    sides: u8,
    claim_depth: usize,
    indexer: InfoSetIndexer,
}

impl Dudo {
    /// The full game on a die with `sides` faces.
    pub fn new(sides: u8) -> Self {
        Self::with_claim_depth(sides, 2 * sides as usize)
    }

    /// A game in which the player facing `claim_depth` claims may only
    /// challenge.
    pub fn with_claim_depth(sides: u8, claim_depth: usize) -> Self {
        debug_assert!(claim_depth >= 1);
        Self {
            sides,
            claim_depth,
            indexer: InfoSetIndexer::new(sides),
        }
    }

    /// Rules matching a validated configuration.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self::with_claim_depth(config.sides, config.effective_claim_depth())
    }

    /// Faces on each die.
    pub fn sides(&self) -> u8 {
        self.sides
    }

    /// Number of claims, `2 * sides`.
    pub fn num_claims(&self) -> usize {
        2 * self.sides as usize
    }

    /// Action index of the challenge.
    pub fn challenge(&self) -> usize {
        self.num_claims()
    }

    /// Claims after which only the challenge is legal.
    pub fn claim_depth(&self) -> usize {
        self.claim_depth
    }

    /// Number of information sets: one per roll for every history of at
    /// most `claim_depth` claims.
    pub fn num_info_sets(&self) -> u64 {
        let n = self.num_claims() as u64;
        let mut histories = 0u64;
        let mut choose = 1u64;
        for k in 0..=self.claim_depth.min(self.num_claims()) as u64 {
            histories += choose;
            choose = choose * (n - k) / (k + 1);
        }
        self.sides as u64 * histories
    }

    /// Information set key encoder for this die.
    pub fn indexer(&self) -> &InfoSetIndexer {
        &self.indexer
    }

    /// Decode a claim index.
    pub fn claim(&self, index: usize) -> Claim {
        Claim::from_index(index, self.sides)
    }

    /// Player to act after `history`.
    pub fn player_to_act(&self, history: ClaimHistory) -> usize {
        history.len() % 2
    }

    /// Legal actions after `history`.
    ///
    /// Any claim stronger than the last one, or the challenge once a claim
    /// has been made. At the claim depth only the challenge remains.
    pub fn legal_actions(&self, history: ClaimHistory) -> ActionRange {
        let challenge = self.challenge();
        if history.len() >= self.claim_depth {
            return ActionRange::new(challenge, challenge);
        }
        match history.last() {
            None => ActionRange::new(0, challenge - 1),
            Some(last) => ActionRange::new(last + 1, challenge),
        }
    }

    /// Utility for the player who made `claim` once it is challenged.
    pub fn claimant_payoff(&self, rolls: [u8; 2], claim: usize) -> f64 {
        let claim = self.claim(claim);
        if claim.matching(rolls) >= claim.count {
            1.0
        } else {
            -1.0
        }
    }

    /// Display name of an action.
    pub fn action_name(&self, action: usize) -> String {
        if action == self.challenge() {
            DUDO.to_string()
        } else {
            self.claim(action).to_string()
        }
    }

    /// Label of the information set of a player holding `roll`.
    pub fn label(&self, roll: u8, history: ClaimHistory) -> String {
        self.indexer.label(roll, history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::{Outcome, PropagatingSolver, RecursiveSolver, SolverConfig, Topology, Trainer};

    #[test]
    fn test_claim_decoding() {
        let names: Vec<String> = (0..4).map(|i| Claim::from_index(i, 2).to_string()).collect();
        assert_eq!(names, vec!["1*2", "1*1", "2*2", "2*1"]);

        let d6 = Dudo::new(6);
        assert_eq!(d6.claim(0), Claim { count: 1, face: 2 });
        assert_eq!(d6.claim(4), Claim { count: 1, face: 6 });
        assert_eq!(d6.claim(5), Claim { count: 1, face: 1 });
        assert_eq!(d6.claim(6), Claim { count: 2, face: 2 });
        assert_eq!(d6.claim(11), Claim { count: 2, face: 1 });
        assert_eq!(d6.action_name(12), DUDO);
    }

    #[test]
    fn test_history_bits() {
        let history = ClaimHistory::EMPTY.with(1).with(4).with(6);
        assert_eq!(history.len(), 3);
        assert_eq!(history.last(), Some(6));
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![1, 4, 6]);
        assert!(history.contains(4) && !history.contains(5));
        assert_eq!(ClaimHistory::EMPTY.last(), None);
        assert!(ClaimHistory::EMPTY.is_empty());
    }

    #[test]
    fn test_legal_actions() {
        let game = Dudo::new(6);
        assert_eq!(game.legal_actions(ClaimHistory::EMPTY), ActionRange::new(0, 11));

        let history = ClaimHistory::EMPTY.with(3);
        assert_eq!(game.legal_actions(history), ActionRange::new(4, 12));

        let last = ClaimHistory::EMPTY.with(11);
        assert_eq!(game.legal_actions(last), ActionRange::new(12, 12));
    }

    #[test]
    fn test_claim_depth_forces_challenge() {
        let game = Dudo::with_claim_depth(6, 2);
        let one = ClaimHistory::EMPTY.with(0);
        assert_eq!(game.legal_actions(one), ActionRange::new(1, 12));
        let two = one.with(1);
        assert_eq!(game.legal_actions(two), ActionRange::new(12, 12));
    }

    #[test]
    fn test_wildcard_payoff() {
        let game = Dudo::new(6);
        // 2*2 holds with a 2 and a wild 1.
        assert_eq!(game.claimant_payoff([2, 1], 6), 1.0);
        assert_eq!(game.claimant_payoff([2, 5], 6), -1.0);
        // 1*1 needs an actual 1.
        assert_eq!(game.claimant_payoff([3, 4], 5), -1.0);
        assert_eq!(game.claimant_payoff([1, 4], 5), 1.0);
        // 2*1 needs both.
        assert_eq!(game.claimant_payoff([1, 1], 11), 1.0);
        assert_eq!(game.claimant_payoff([1, 6], 11), -1.0);
    }

    #[test]
    fn test_payoffs_are_zero_sum() {
        // Claimant and challenger utilities cancel for every claim and deal,
        // and every claim on a d3 can both hold and fail.
        let game = Dudo::new(3);
        for claim in 0..game.num_claims() {
            let history = ClaimHistory::EMPTY.with(claim);
            let mut outcomes = Vec::new();
            for a in 1..=3 {
                for b in 1..=3 {
                    let deal = DudoDeal { rolls: [a, b] };
                    let claimant = game.claimant_payoff(deal.rolls, claim);
                    let challenger = match game.outcome(history, &deal, game.challenge()).unwrap() {
                        Outcome::Terminal(u) => u,
                        other => panic!("challenge did not end the game: {:?}", other),
                    };
                    assert_eq!(claimant + challenger, 0.0, "claim {} on {:?}", claim, deal);
                    assert!(claimant == 1.0 || claimant == -1.0);
                    outcomes.push(claimant);
                }
            }
            assert!(outcomes.contains(&1.0), "claim {} never holds", claim);
            assert!(outcomes.contains(&-1.0), "claim {} always holds", claim);
        }
    }

    #[test]
    fn test_dudo_cfr_convergence() {
        let config = SolverConfig::new().with_sides(2).with_seed(42);
        let mut solver = RecursiveSolver::new(config).unwrap();
        let stats = solver.train(50_000).unwrap();

        // Every subset of the four claims, for each of the two rolls.
        assert_eq!(stats.info_sets, 32);

        // The opener wins three games in four: value 1/2.
        let value = stats.game_value();
        println!("Game value: {:.4}", value);
        assert!((value - 0.5).abs() < 0.03, "game value {} should be near 1/2", value);

        // Holding a 2 the opener claims 2*2 outright.
        let two = solver.average_strategy(2, ClaimHistory::EMPTY).unwrap();
        println!("Roll 2 opening: {:?}", two);
        assert!(two[2] > 0.95, "roll 2 should open 2*2: {:?}", two);

        // Holding the wild 1 the opener mixes between the two-dice claims.
        let one = solver.average_strategy(1, ClaimHistory::EMPTY).unwrap();
        println!("Roll 1 opening: {:?}", one);
        assert!(one[2] + one[3] > 0.95, "roll 1 should claim two dice: {:?}", one);
        assert!(one[2] > 1e-3 && one[3] > 1e-3, "roll 1 should mix: {:?}", one);

        // Facing 2*2 while holding a 1, raising to 2*1 beats challenging
        // a claim that every die satisfies.
        let facing = solver
            .average_strategy(1, ClaimHistory::EMPTY.with(2))
            .unwrap();
        println!("Roll 1 facing 2*2: {:?}", facing);
        assert!(facing[0] > 0.5, "roll 1 should raise to 2*1: {:?}", facing);
    }

    #[test]
    fn test_bounded_game_converges_to_same_value() {
        let config = SolverConfig::new().with_sides(2).with_claim_depth(2).with_seed(9);
        let mut solver: PropagatingSolver<Dudo> = PropagatingSolver::new(config).unwrap();
        let stats = solver.train(50_000).unwrap();

        assert_eq!(stats.info_sets, 22);
        let value = stats.game_value();
        assert!((value - 0.5).abs() < 0.03, "game value {} should be near 1/2", value);
    }
}
