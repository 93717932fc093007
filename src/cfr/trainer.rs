//! The training loop shared by both solvers.
//!
//! A solver only has to say how to run one iteration and how to discard
//! its strategy sums; [`Trainer`] supplies the iteration loop, the
//! warm-start discard, game-value bookkeeping and progress callbacks.

use std::time::Instant;

use crate::cfr::config::{SolverConfig, TrainingStats};
use crate::cfr::error::SolverError;

/// A CFR solver that can be trained iteration by iteration.
pub trait Trainer {
    /// Configuration of the run.
    fn config(&self) -> &SolverConfig;

    /// Number of iterations completed.
    fn iteration(&self) -> u64;

    /// Number of information sets in the node store.
    fn num_info_sets(&self) -> usize;

    /// Estimated bytes held by the node store.
    fn memory_usage(&self) -> usize;

    /// Statistics of the run so far.
    fn stats(&self) -> &TrainingStats;

    /// Mutable statistics, for the training loop.
    fn stats_mut(&mut self) -> &mut TrainingStats;

    /// Run one iteration and return player 0's utility at the root.
    fn run_iteration(&mut self) -> Result<f64, SolverError>;

    /// Reset every node's strategy sum, keeping regrets.
    fn discard_strategy_sums(&mut self);

    /// Train the solver for a specified number of iterations.
    fn train(&mut self, iterations: u64) -> Result<&TrainingStats, SolverError> {
        self.train_with_callback(iterations, 0, |_| {})
    }

    /// Train with a callback for progress tracking.
    ///
    /// # Arguments
    /// * `iterations` - Number of iterations to run
    /// * `callback_interval` - How often to call the callback (0 = never)
    /// * `callback` - Function called every `callback_interval` iterations
    fn train_with_callback<F>(
        &mut self,
        iterations: u64,
        callback_interval: u64,
        mut callback: F,
    ) -> Result<&TrainingStats, SolverError>
    where
        F: FnMut(&TrainingStats),
    {
        let start_time = Instant::now();
        let elapsed_before = self.stats().elapsed_seconds;
        let discard_at = self.config().discard_point(iterations);

        log::info!(
            "training {} iterations on a d{} ({} info sets)",
            iterations,
            self.config().sides,
            self.num_info_sets()
        );

        for i in 1..=iterations {
            let value = self.run_iteration()?;
            self.stats_mut().utility_sum += value;

            if discard_at == Some(i) {
                self.discard_strategy_sums();
                let iteration = self.iteration();
                self.stats_mut().discarded_at = Some(iteration);
                log::info!("discarded strategy sums after iteration {}", iteration);
            }

            if callback_interval > 0 && i % callback_interval == 0 {
                refresh_stats(self, start_time, elapsed_before);
                log::debug!(
                    "iteration {}: game value {:.5}, {:.0} it/s",
                    self.stats().iterations,
                    self.stats().game_value(),
                    self.stats().iterations_per_second
                );
                callback(self.stats());
            }
        }

        refresh_stats(self, start_time, elapsed_before);
        log::info!(
            "finished at iteration {}: game value {:.5}, {} info sets, {:.2}s",
            self.stats().iterations,
            self.stats().game_value(),
            self.stats().info_sets,
            self.stats().elapsed_seconds
        );

        Ok(self.stats())
    }
}

fn refresh_stats<T: Trainer + ?Sized>(trainer: &mut T, start_time: Instant, elapsed_before: f64) {
    let iterations = trainer.iteration();
    let info_sets = trainer.num_info_sets();
    let stats = trainer.stats_mut();
    stats.iterations = iterations;
    stats.info_sets = info_sets;
    stats.elapsed_seconds = elapsed_before + start_time.elapsed().as_secs_f64();
    stats.update_rate();
}
