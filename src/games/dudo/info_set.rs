//! Information set keys for Dudo.
//!
//! A player's information set is their own roll and the claims made so
//! far. The key packs both into one integer: the roll above the
//! `2 * sides` history bits.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Claim, ClaimHistory};

/// Packed `(roll, history)` information set key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct InfoSetKey(u64);

impl InfoSetKey {
    /// Raw packed value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InfoSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encodes and decodes information set keys for one die size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoSetIndexer {
    sides: u8,
}

impl InfoSetIndexer {
    /// Indexer for a die with `sides` faces.
    pub fn new(sides: u8) -> Self {
        Self { sides }
    }

    fn history_bits(&self) -> usize {
        2 * self.sides as usize
    }

    /// Key for a player holding `roll` after `history`.
    pub fn encode(&self, roll: u8, history: ClaimHistory) -> InfoSetKey {
        debug_assert!((1..=self.sides).contains(&roll));
        debug_assert!(u64::from(history.bits()) < 1 << self.history_bits());
        InfoSetKey(u64::from(roll) << self.history_bits() | u64::from(history.bits()))
    }

    /// Inverse of [`encode`](InfoSetIndexer::encode).
    pub fn decode(&self, key: InfoSetKey) -> (u8, ClaimHistory) {
        let shift = self.history_bits();
        let roll = (key.0 >> shift) as u8;
        let history = ClaimHistory::from_bits((key.0 & ((1 << shift) - 1)) as u32);
        (roll, history)
    }

    /// Claims of `history` in the order made, e.g. `1*2,2*5`.
    pub fn history_label(&self, history: ClaimHistory) -> String {
        history
            .iter()
            .map(|c| Claim::from_index(c, self.sides).to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Human-readable label, e.g. `3|1*2,2*5`.
    pub fn label(&self, roll: u8, history: ClaimHistory) -> String {
        format!("{}|{}", roll, self.history_label(history))
    }
}
