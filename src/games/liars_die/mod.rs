//! Liar's Die.
//!
//! One die is passed between two players. The claimant rolls it in secret
//! and claims a value strictly higher than the previous claim. The other
//! player either doubts, ending the game, or accepts: they take the die,
//! re-roll it and must make a higher claim themselves. A doubted claim
//! wins for the claimant if the die shows at least the claimed value.
//!
//! A claimant knows their roll and the claim they are raising; a responder
//! knows only the two claims. Accepting hands the move to the player who
//! just responded, so a claim node follows a response node of the same
//! player.

use std::fmt;

use crate::cfr::config::SolverConfig;
use crate::cfr::dice::RollSource;
use crate::cfr::error::SolverError;
use crate::cfr::graph::GraphBuilder;
use crate::cfr::node::{ActionRange, DecisionNode};
use crate::cfr::propagating::{Outcome, Topology};

/// Response action: challenge the claim.
pub const DOUBT: usize = 0;
/// Response action: take the die.
pub const ACCEPT: usize = 1;

/// Information set of a Liar's Die decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiarDieKey {
    /// Claiming with `roll` over the opponent's claim `prior` (0 opens).
    Claim {
        /// Claim being raised.
        prior: u8,
        /// Value the die shows.
        roll: u8,
    },
    /// Facing `claim` after having claimed `prior` oneself.
    Response {
        /// Own previous claim.
        prior: u8,
        /// Claim being answered.
        claim: u8,
    },
}

impl fmt::Display for LiarDieKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiarDieKey::Claim { prior, roll } => write!(f, "roll {} over {}", roll, prior),
            LiarDieKey::Response { prior, claim } => write!(f, "claim {} over {}", claim, prior),
        }
    }
}

/// Position in the game before the die is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiarDieSlot {
    /// A claim must be made over `prior`.
    Claim {
        /// Claim being raised.
        prior: u8,
    },
    /// `claim` must be doubted or accepted.
    Response {
        /// Responder's own previous claim.
        prior: u8,
        /// Claim being answered.
        claim: u8,
    },
}

/// Rolls of one iteration.
///
/// `rolls[c]` is what the die shows for the player who accepted claim `c`;
/// `rolls[0]` is the opening roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiarDieDeal {
    /// One roll per claim value below the die size.
    pub rolls: Vec<u8>,
}

/// Rules of Liar's Die for a given die.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiarDie {
    sides: u8,
}

impl LiarDie {
    /// Rules for a die with `sides` faces.
    pub fn new(sides: u8) -> Self {
        Self { sides }
    }

    /// Faces on the die.
    pub fn sides(&self) -> u8 {
        self.sides
    }

    /// Legal actions at a slot: claims above `prior`, or doubt/accept.
    ///
    /// The highest claim can only be doubted.
    pub fn legal_actions(&self, slot: LiarDieSlot) -> ActionRange {
        let sides = self.sides as usize;
        match slot {
            LiarDieSlot::Claim { prior } => ActionRange::new(prior as usize + 1, sides),
            LiarDieSlot::Response { claim, .. } if claim as usize == sides => {
                ActionRange::new(DOUBT, DOUBT)
            }
            LiarDieSlot::Response { .. } => ActionRange::new(DOUBT, ACCEPT),
        }
    }

    /// Utility for the responder who doubts `claim` made on `roll`.
    pub fn doubt_payoff(&self, claim: u8, roll: u8) -> f64 {
        if claim > roll {
            1.0
        } else {
            -1.0
        }
    }

    fn add_slot(
        &self,
        builder: &mut GraphBuilder<LiarDieKey, LiarDieSlot>,
        depth: usize,
        slot: LiarDieSlot,
    ) -> Result<(), SolverError> {
        builder.add_slot(depth, slot);
        let actions = self.legal_actions(slot);
        match slot {
            LiarDieSlot::Claim { prior } => {
                for roll in 1..=self.sides {
                    let key = LiarDieKey::Claim { prior, roll };
                    builder.add_node(key, DecisionNode::new(key.to_string(), actions))?;
                }
            }
            LiarDieSlot::Response { prior, claim } => {
                let key = LiarDieKey::Response { prior, claim };
                builder.add_node(key, DecisionNode::new(key.to_string(), actions))?;
            }
        }
        Ok(())
    }
}

impl Topology for LiarDie {
    type Key = LiarDieKey;
    type Slot = LiarDieSlot;
    type Deal = LiarDieDeal;

    fn from_config(config: &SolverConfig) -> Self {
        LiarDie::new(config.sides)
    }

    fn name(&self) -> &'static str {
        "liars-die"
    }

    /// A claim node per prior claim and roll, plus a response node per
    /// pair of prior and higher claim.
    fn num_info_sets(&self) -> u64 {
        let sides = self.sides as u64;
        sides * sides + sides * (sides + 1) / 2
    }

    /// Claim slots over `c` sit on layer `2c`, responses to `c` on layer
    /// `2c - 1`.
    fn enumerate(
        &self,
        builder: &mut GraphBuilder<LiarDieKey, LiarDieSlot>,
    ) -> Result<(), SolverError> {
        self.add_slot(builder, 0, LiarDieSlot::Claim { prior: 0 })?;
        for claim in 1..=self.sides {
            let depth = 2 * claim as usize;
            for prior in 0..claim {
                self.add_slot(builder, depth - 1, LiarDieSlot::Response { prior, claim })?;
            }
            if claim < self.sides {
                self.add_slot(builder, depth, LiarDieSlot::Claim { prior: claim })?;
            }
        }
        Ok(())
    }

    fn deal<D: RollSource>(&self, dice: &mut D) -> LiarDieDeal {
        LiarDieDeal {
            rolls: (0..self.sides).map(|_| dice.roll(self.sides)).collect(),
        }
    }

    fn node_key(&self, slot: LiarDieSlot, deal: &LiarDieDeal) -> LiarDieKey {
        match slot {
            LiarDieSlot::Claim { prior } => LiarDieKey::Claim {
                prior,
                roll: deal.rolls[prior as usize],
            },
            LiarDieSlot::Response { prior, claim } => LiarDieKey::Response { prior, claim },
        }
    }

    fn outcome(
        &self,
        slot: LiarDieSlot,
        deal: &LiarDieDeal,
        action: usize,
    ) -> Result<Outcome<LiarDieKey>, SolverError> {
        match slot {
            LiarDieSlot::Claim { prior } => Ok(Outcome::Continue {
                key: LiarDieKey::Response { prior, claim: action as u8 },
                alternates: true,
            }),
            LiarDieSlot::Response { prior, claim } => match action {
                DOUBT => Ok(Outcome::Terminal(
                    self.doubt_payoff(claim, deal.rolls[prior as usize]),
                )),
                ACCEPT => Ok(Outcome::Continue {
                    key: self.node_key(LiarDieSlot::Claim { prior: claim }, deal),
                    alternates: false,
                }),
                _ => Err(SolverError::InvalidState(format!(
                    "response action {} at {:?}",
                    action, slot
                ))),
            },
        }
    }

    fn action_name(&self, key: LiarDieKey, action: usize) -> String {
        match (key, action) {
            (LiarDieKey::Claim { .. }, claim) => format!("claim {}", claim),
            (LiarDieKey::Response { .. }, DOUBT) => "doubt".to_string(),
            (LiarDieKey::Response { .. }, _) => "accept".to_string(),
        }
    }
}
