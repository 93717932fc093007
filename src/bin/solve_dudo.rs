//! Dudo / Liar's Die solver binary.
//!
//! Usage:
//!   cargo run --release --bin solve_dudo -- [OPTIONS]
//!
//! Options:
//!   --game <NAME>        dudo or liars-die (default: dudo)
//!   --solver <NAME>      recursive or propagating (default: propagating)
//!   --sides <N>          Die sides (default: 6)
//!   --iterations <N>     Iterations (default: 100000)
//!   --depth <N>          Dudo claim depth bound (default: full game; Dudo only)
//!   --discard <F>        Discard strategy sums after this fraction of training
//!                        (default: 0.2 for dudo, 0.5 for liars-die)
//!   --seed <N>           Random seed (optional)
//!   --output <FILE>      Output file (default: strategy.json)
//!
//! Set `RUST_LOG=debug` for per-interval progress logs.

use std::env;
use std::process;

use indicatif::{ProgressBar, ProgressStyle};

use dudo_cfr::cfr::{SolverConfig, SolverError, StrategyReport, Trainer, TrainingStats};
use dudo_cfr::games::dudo::Dudo;
use dudo_cfr::games::liars_die::LiarDie;
use dudo_cfr::{PropagatingSolver, RecursiveSolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameKind {
    Dudo,
    LiarsDie,
}

impl GameKind {
    /// Fraction of training after which strategy sums are discarded unless
    /// `--discard` says otherwise.
    fn default_discard(self) -> f64 {
        match self {
            GameKind::Dudo => 0.2,
            GameKind::LiarsDie => 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolverKind {
    Recursive,
    Propagating,
}

#[derive(Debug, Clone)]
struct Options {
    game: GameKind,
    solver: SolverKind,
    iterations: u64,
    output_file: String,
    config: SolverConfig,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut game = GameKind::Dudo;
    let mut solver = SolverKind::Propagating;
    let mut iterations: u64 = 100_000;
    let mut output_file = "strategy.json".to_string();
    let mut config = SolverConfig::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).map(String::as_str);
        match (args[i].as_str(), value) {
            ("--game" | "-g", Some(v)) => {
                game = match v {
                    "dudo" => GameKind::Dudo,
                    "liars-die" | "liar" => GameKind::LiarsDie,
                    _ => return Err(format!("unknown game: {}", v)),
                };
                i += 1;
            }
            ("--solver", Some(v)) => {
                solver = match v {
                    "recursive" => SolverKind::Recursive,
                    "propagating" => SolverKind::Propagating,
                    _ => return Err(format!("unknown solver: {}", v)),
                };
                i += 1;
            }
            ("--sides", Some(v)) => {
                config.sides = parse(v, "--sides")?;
                i += 1;
            }
            ("--iterations" | "-i", Some(v)) => {
                iterations = parse(v, "--iterations")?;
                i += 1;
            }
            ("--depth" | "-d", Some(v)) => {
                config.claim_depth = Some(parse(v, "--depth")?);
                i += 1;
            }
            ("--discard", Some(v)) => {
                config.discard_fraction = Some(parse(v, "--discard")?);
                i += 1;
            }
            ("--seed" | "-s", Some(v)) => {
                config.seed = Some(parse(v, "--seed")?);
                i += 1;
            }
            ("--output" | "-o", Some(v)) => {
                output_file = v.to_string();
                i += 1;
            }
            ("--help" | "-h", _) => {
                return Ok(Options {
                    game,
                    solver,
                    iterations,
                    output_file,
                    config,
                    help: true,
                });
            }
            (arg, _) => return Err(format!("unknown or incomplete argument: {}", arg)),
        }
        i += 1;
    }

    if game == GameKind::LiarsDie {
        if solver == SolverKind::Recursive {
            return Err("Liar's Die is only solved by the propagating solver".to_string());
        }
        if config.claim_depth.is_some() {
            return Err("--depth only applies to Dudo".to_string());
        }
    }
    if config.discard_fraction.is_none() {
        config.discard_fraction = Some(game.default_discard());
    }

    Ok(Options {
        game,
        solver,
        iterations,
        output_file,
        config,
        help: false,
    })
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => usage_error(&message),
    };
    if options.help {
        print_help();
        return;
    }
    let Options {
        game,
        solver: solver_kind,
        iterations,
        output_file,
        config,
        ..
    } = options;

    println!("=================================================");
    println!("  Dudo CFR Solver");
    println!("=================================================");
    println!();
    println!("Game: {:?} (d{})", game, config.sides);
    println!("Solver: {:?}", solver_kind);
    println!("Iterations: {}", iterations);
    if let Some(depth) = config.claim_depth {
        println!("Claim depth: {}", depth);
    }
    if let Some(fraction) = config.discard_fraction.filter(|&f| f > 0.0) {
        println!("Discard after: {:.0}% of training", fraction * 100.0);
    }
    if let Some(seed) = config.seed {
        println!("Seed: {}", seed);
    }
    println!("Output: {}", output_file);
    println!();

    let result = match (game, solver_kind) {
        (GameKind::Dudo, SolverKind::Recursive) => RecursiveSolver::new(config)
            .and_then(|mut s| train(&mut s, iterations).map(|_| s.report())),
        (GameKind::Dudo, SolverKind::Propagating) => PropagatingSolver::<Dudo>::new(config)
            .and_then(|mut s| train(&mut s, iterations).map(|_| s.report())),
        (GameKind::LiarsDie, _) => PropagatingSolver::<LiarDie>::new(config)
            .and_then(|mut s| train(&mut s, iterations).map(|_| s.report())),
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    print_summary(&report);

    println!("Exporting results to {}...", output_file);
    match report.save_json(&output_file) {
        Ok(_) => println!("Results saved successfully!"),
        Err(e) => eprintln!("Error saving results: {}", e),
    }
}

/// Train with a progress bar and return the final statistics.
fn train<S: Trainer>(solver: &mut S, iterations: u64) -> Result<TrainingStats, SolverError> {
    let bar = ProgressBar::new(iterations);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
    {
        bar.set_style(style.progress_chars("#>-"));
    }

    let interval = (iterations / 100).max(1);
    let stats = solver
        .train_with_callback(iterations, interval, |stats| {
            bar.set_position(stats.iterations);
            bar.set_message(format!("value {:+.4}", stats.game_value()));
        })?
        .clone();
    bar.finish_with_message("done");

    println!();
    println!("Training complete!");
    println!("Total time: {:.2}s", stats.elapsed_seconds);
    println!("Info sets: {}", stats.info_sets);
    println!(
        "Memory: {:.1} MB",
        solver.memory_usage() as f64 / (1024.0 * 1024.0)
    );
    println!("Average speed: {:.0} iterations/second", stats.iterations_per_second);
    if let Some(at) = stats.discarded_at {
        println!("Strategy sums discarded after iteration {}", at);
    }
    Ok(stats)
}

fn print_summary(report: &StrategyReport) {
    println!();
    println!("Game value (first player): {:+.5}", report.metadata.game_value);
    println!();
    println!("=== Opening Strategies ===");
    println!();

    // Dudo openings have an empty history; Liar's Die prints the opening
    // claims and the responses to them.
    for entry in report
        .strategies
        .iter()
        .filter(|e| e.label.ends_with('|') || e.label.ends_with("over 0"))
    {
        println!("{}", entry.label);
        for (action, prob) in entry.actions.iter().zip(&entry.strategy) {
            if *prob > 0.001 {
                println!("  {}: {:.1}%", action, prob * 100.0);
            }
        }
    }
    println!();
}

fn parse<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid value for {}: {}", flag, value))
}

fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!();
    print_help();
    process::exit(2);
}

fn print_help() {
    println!("Dudo CFR Solver");
    println!();
    println!("Usage: solve_dudo [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -g, --game <NAME>        dudo or liars-die (default: dudo)");
    println!("  --solver <NAME>          recursive or propagating (default: propagating)");
    println!("  --sides <N>              Die sides, 2 to 12 (default: 6)");
    println!("  -i, --iterations <N>     Iterations (default: 100000)");
    println!("  -d, --depth <N>          Force a challenge after N claims (Dudo only)");
    println!("  --discard <F>            Discard strategy sums after fraction F of training");
    println!("                           (default: 0.2 for dudo, 0.5 for liars-die; 0 keeps all)");
    println!("  -s, --seed <N>           Random seed");
    println!("  -o, --output <FILE>      Output file (default: strategy.json)");
    println!("  -h, --help               Show this help");
    println!();
    println!("Examples:");
    println!("  # Full d6 Dudo, discarding only the first tenth of the average");
    println!("  solve_dudo --iterations 1000000 --discard 0.1");
    println!();
    println!("  # Liar's Die on a d6");
    println!("  solve_dudo --game liars-die --iterations 200000");
}
