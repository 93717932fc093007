//! End-to-end properties of both solvers through the public API.

use dudo_cfr::cfr::{
    ConfigError, PropagatingSolver, RecursiveSolver, ReplayDice, SolverConfig, SolverError,
    StrategyReport, Trainer, MAX_INFO_SETS,
};
use dudo_cfr::games::dudo::{ClaimHistory, Dudo};
use dudo_cfr::games::liars_die::LiarDie;

fn assert_distributions(report: &StrategyReport) {
    for entry in &report.strategies {
        let sum: f64 = entry.strategy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "{} sums to {}", entry.label, sum);
        assert!(
            entry.strategy.iter().all(|&p| p >= 0.0),
            "{} has a negative probability",
            entry.label
        );
        assert_eq!(entry.strategy.len(), entry.actions.len());
    }
}

#[test]
fn test_replayed_dice_are_bit_identical() {
    let rolls = vec![1, 3, 2, 2, 3, 1, 1, 1, 2, 3];
    let config = SolverConfig::new().with_sides(3);

    let mut a = RecursiveSolver::with_dice(config.clone(), ReplayDice::new(rolls.clone())).unwrap();
    let mut b = RecursiveSolver::with_dice(config, ReplayDice::new(rolls)).unwrap();
    a.train(300).unwrap();
    b.train(300).unwrap();

    assert_eq!(a.num_info_sets(), b.num_info_sets());
    assert_eq!(a.stats().utility_sum, b.stats().utility_sum);
    for ((ka, na), (kb, nb)) in a.store().iter().zip(b.store().iter()) {
        assert_eq!(ka, kb);
        assert_eq!(na.regret_sum(), nb.regret_sum());
        assert_eq!(na.strategy_sum(), nb.strategy_sum());
    }
}

#[test]
fn test_reports_hold_distributions() {
    let config = SolverConfig::new().with_sides(3).with_seed(4);

    let mut recursive = RecursiveSolver::new(config.clone()).unwrap();
    recursive.train(2_000).unwrap();
    assert_distributions(&recursive.report());

    let mut dudo: PropagatingSolver<Dudo> = PropagatingSolver::new(config.clone()).unwrap();
    dudo.train(2_000).unwrap();
    assert_distributions(&dudo.report());

    let mut liar: PropagatingSolver<LiarDie> = PropagatingSolver::new(config).unwrap();
    liar.train(2_000).unwrap();
    assert_distributions(&liar.report());
}

#[test]
fn test_untrained_nodes_are_uniform() {
    let config = SolverConfig::new().with_sides(4);
    let solver: PropagatingSolver<Dudo> = PropagatingSolver::new(config).unwrap();
    let key = solver.topology().indexer().encode(2, ClaimHistory::EMPTY);
    assert_eq!(solver.average_strategy(&key), Some(vec![0.125; 8]));
}

#[test]
fn test_invalid_config_is_rejected() {
    let err = RecursiveSolver::new(SolverConfig::new().with_sides(20)).err();
    assert_eq!(err, Some(SolverError::Config(ConfigError::InvalidSides(20))));

    let err = PropagatingSolver::<Dudo>::new(SolverConfig::new().with_discard_fraction(-0.1)).err();
    assert!(matches!(
        err,
        Some(SolverError::Config(ConfigError::InvalidDiscardFraction(_)))
    ));
}

#[test]
fn test_oversized_game_is_rejected() {
    let config = SolverConfig::new().with_sides(12);
    let too_many = SolverError::Config(ConfigError::TooManyInfoSets {
        count: 12 << 24,
        max: MAX_INFO_SETS,
    });
    assert_eq!(RecursiveSolver::new(config.clone()).err(), Some(too_many.clone()));
    assert_eq!(PropagatingSolver::<Dudo>::new(config.clone()).err(), Some(too_many));

    let bounded: PropagatingSolver<Dudo> =
        PropagatingSolver::new(config.clone().with_claim_depth(2)).unwrap();
    assert_eq!(bounded.num_info_sets(), 12 * 301);
    assert!(RecursiveSolver::new(config.clone().with_claim_depth(2)).is_ok());

    // Liar's Die on the same die is small.
    let liar: PropagatingSolver<LiarDie> = PropagatingSolver::new(config).unwrap();
    assert_eq!(liar.num_info_sets(), 144 + 78);
}

#[test]
fn test_report_json() {
    let config = SolverConfig::new().with_sides(2).with_seed(3);
    let mut solver = RecursiveSolver::new(config).unwrap();
    solver.train(1_000).unwrap();

    let report = solver.report();
    let json = report.to_json().unwrap();
    let parsed: StrategyReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.metadata.iterations, 1_000);
    assert_eq!(parsed.metadata.game, "dudo");
    assert_eq!(parsed.strategies.len(), report.strategies.len());

    let path = std::env::temp_dir().join("dudo_cfr_report_test.json");
    report.save_json(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, json);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_training_continues_across_calls() {
    let config = SolverConfig::new().with_sides(2).with_seed(12);
    let mut solver: PropagatingSolver<LiarDie> = PropagatingSolver::new(config).unwrap();
    solver.train(100).unwrap();
    let stats = solver.train(150).unwrap();
    assert_eq!(stats.iterations, 250);
    assert!(stats.game_value().abs() <= 1.0);

    let mut calls = 0;
    solver
        .train_with_callback(100, 25, |stats| {
            calls += 1;
            assert_eq!(stats.iterations % 25, 0);
        })
        .unwrap();
    assert_eq!(calls, 4);
}
