//! Average-strategy reports.
//!
//! A report is the solver's final output: for every information set its
//! label, the names of its legal actions and the average strategy. The
//! report can be printed or saved as JSON; it is never read back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use std::fs::File;
use std::hash::Hash;
use std::io::Write;
use std::path::Path;

use crate::cfr::config::{SolverConfig, TrainingStats};
use crate::cfr::storage::NodeStore;

/// Strategy entry for a single information set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyEntry {
    /// Information set label
    pub label: String,
    /// Action names
    pub actions: Vec<String>,
    /// Average strategy probabilities
    pub strategy: Vec<f64>,
}

impl fmt::Display for StrategyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>16}:", self.label)?;
        for (name, p) in self.actions.iter().zip(&self.strategy) {
            write!(f, " {}={:.5}", name, p)?;
        }
        Ok(())
    }
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Game name
    pub game: String,
    /// Die sides
    pub sides: u8,
    /// Claim depth bound, if any
    pub claim_depth: Option<usize>,
    /// Number of iterations
    pub iterations: u64,
    /// Number of info sets
    pub num_info_sets: usize,
    /// Average game value for the first player
    pub game_value: f64,
}

/// Complete solver output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyReport {
    /// Solver metadata
    pub metadata: ReportMetadata,
    /// Strategies ordered by information set key
    pub strategies: Vec<StrategyEntry>,
}

impl StrategyReport {
    /// Build a report from a trained node store.
    ///
    /// `action_name` maps a node key and a global action index to a
    /// display name.
    pub fn from_store<K, F>(
        game: &str,
        config: &SolverConfig,
        stats: &TrainingStats,
        store: &NodeStore<K>,
        action_name: F,
    ) -> Self
    where
        K: Copy + Eq + Hash + Ord + Debug,
        F: Fn(K, usize) -> String,
    {
        let mut nodes: Vec<_> = store.iter().collect();
        nodes.sort_by_key(|(key, _)| *key);

        let strategies = nodes
            .into_iter()
            .map(|(key, node)| StrategyEntry {
                label: node.label().to_string(),
                actions: node.actions().iter().map(|a| action_name(key, a)).collect(),
                strategy: node.average_strategy(),
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                game: game.to_string(),
                sides: config.sides,
                claim_depth: config.claim_depth,
                iterations: stats.iterations,
                num_info_sets: store.len(),
                game_value: stats.game_value(),
            },
            strategies,
        }
    }

    /// Get strategy for an information set by label.
    pub fn get(&self, label: &str) -> Option<&StrategyEntry> {
        self.strategies.iter().find(|e| e.label == label)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Save to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }
}

impl fmt::Display for StrategyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} d{}: {} info sets after {} iterations, game value {:.5}",
            self.metadata.game,
            self.metadata.sides,
            self.metadata.num_info_sets,
            self.metadata.iterations,
            self.metadata.game_value
        )?;
        for entry in &self.strategies {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
