//! physrogue headless run simulator
//!
//! Plays complete runs against the built-in content with a fixed answer
//! accuracy, collecting outcomes for balance tuning. Drives the same
//! `GameSession` API a front end uses.
//!
//! Usage:
//!   cargo run --bin physrogue-sim -- [OPTIONS]
//!
//! Options:
//!   --runs N        Number of runs with incrementing seeds (default: 100)
//!   --seed N        RNG seed (default: 42)
//!   --accuracy P    Probability of answering correctly, 0.0-1.0 (default: 0.7)
//!   --floors N      Floors per run (default: 10)
//!   --class ID      Character class (default: resident)
//!   --challenge ID  Challenge mode
//!   --catalog DIR   Load content and questions from DIR
//!   --user-content  Load content from ~/.physrogue/catalog
//!   --verbose       Per-run result lines
//!   --quiet         Only final summary line

use physrogue::catalog::{self, Catalog};
use physrogue::core::{GameError, RunConfig};
use physrogue::path::NodeType;
use physrogue::questions::{QuestionBank, UnseenFirstSelector};
use physrogue::run::{FloorProgress, GameSession, RunSummary};
use physrogue::utils::build_info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Separates the answer policy's stream from the session's.
const POLICY_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Upper bound on session calls per run; guards against a stuck policy.
const MAX_STEPS_PER_RUN: usize = 10_000;

// ── CLI Configuration ────────────────────────────────────────────────

struct SimConfig {
    runs: u32,
    seed: u64,
    accuracy: f64,
    floors: usize,
    class_id: String,
    challenge: Option<String>,
    catalog_dir: Option<PathBuf>,
    user_content: bool,
    verbose: bool,
    quiet: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            runs: 100,
            seed: 42,
            accuracy: 0.7,
            floors: RunConfig::default().max_floors,
            class_id: "resident".to_string(),
            challenge: None,
            catalog_dir: None,
            user_content: false,
            verbose: false,
            quiet: false,
        }
    }
}

fn value_for<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).and_then(|v| v.parse().ok()) {
        Some(value) => value,
        None => {
            eprintln!("{flag} requires a value");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn parse_args() -> SimConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = SimConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                config.runs = value_for(&args, i, "--runs");
            }
            "--seed" => {
                i += 1;
                config.seed = value_for(&args, i, "--seed");
            }
            "--accuracy" => {
                i += 1;
                let accuracy: f64 = value_for(&args, i, "--accuracy");
                config.accuracy = accuracy.clamp(0.0, 1.0);
            }
            "--floors" => {
                i += 1;
                config.floors = value_for(&args, i, "--floors");
            }
            "--class" => {
                i += 1;
                config.class_id = value_for(&args, i, "--class");
            }
            "--challenge" => {
                i += 1;
                config.challenge = Some(value_for(&args, i, "--challenge"));
            }
            "--catalog" => {
                i += 1;
                config.catalog_dir = Some(value_for(&args, i, "--catalog"));
            }
            "--user-content" => config.user_content = true,
            "--verbose" => config.verbose = true,
            "--quiet" => config.quiet = true,
            "--version" | "-V" => {
                println!("{}", build_info::version_line());
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }
    config
}

fn print_usage() {
    eprintln!(
        "physrogue headless run simulator\n\
         \n\
         Usage: physrogue-sim [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --runs N        Number of runs with incrementing seeds (default: 100)\n\
         \x20 --seed N        RNG seed (default: 42)\n\
         \x20 --accuracy P    Probability of a correct answer (default: 0.7)\n\
         \x20 --floors N      Floors per run (default: 10)\n\
         \x20 --class ID      Character class (default: resident)\n\
         \x20 --challenge ID  Challenge mode (ironman, study_mode, ...)\n\
         \x20 --catalog DIR   Load content and questions from DIR\n\
         \x20 --user-content  Load content from ~/.physrogue/catalog\n\
         \x20 --verbose       Per-run result lines\n\
         \x20 --quiet         Only final summary line\n\
         \x20 --version, -V   Print version\n\
         \x20 --help, -h      Show this help"
    );
}

// ── Simulation Statistics ────────────────────────────────────────────

#[derive(Debug, Default)]
struct SimStats {
    runs: u32,
    wins: u32,
    total_score: i64,
    best_score: i64,
    total_floor: u64,
    total_accuracy: f64,
    total_level: u64,
    best_streak: u32,
    defeats_by_floor: BTreeMap<u32, u32>,
    visits_by_type: BTreeMap<NodeType, u64>,
    play_styles: BTreeMap<String, u32>,
    achievements_unlocked: u32,
}

impl SimStats {
    fn record(&mut self, summary: &RunSummary, new_achievements: usize) {
        self.runs += 1;
        if summary.success {
            self.wins += 1;
        } else {
            *self.defeats_by_floor.entry(summary.floor_reached).or_insert(0) += 1;
        }
        self.total_score += summary.final_score;
        self.best_score = self.best_score.max(summary.final_score);
        self.total_floor += summary.floor_reached as u64;
        self.total_accuracy += summary.accuracy();
        self.total_level += summary.level as u64;
        self.best_streak = self.best_streak.max(summary.best_streak);
        for (node_type, count) in &summary.statistics.visits_by_type {
            *self.visits_by_type.entry(*node_type).or_insert(0) += *count as u64;
        }
        *self
            .play_styles
            .entry(format!("{:?}", summary.statistics.play_style))
            .or_insert(0) += 1;
        self.achievements_unlocked += new_achievements as u32;
    }

    fn mean(&self, total: f64) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            total / self.runs as f64
        }
    }
}

// ── Core Simulation Loop ─────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum SimError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("no reachable node on floor {0}")]
    Stuck(u32),
    #[error("step limit reached")]
    StepLimit,
}

struct RunResult {
    summary: RunSummary,
    new_achievements: usize,
}

fn run_simulation(
    config: &SimConfig,
    catalog: &Arc<Catalog>,
    questions: &Arc<QuestionBank>,
    seed: u64,
) -> Result<RunResult, SimError> {
    let run_config = RunConfig {
        max_floors: config.floors,
        ..RunConfig::default()
    }
    .normalized();
    let mut session = GameSession::with_rng(
        Arc::clone(catalog),
        Arc::clone(questions),
        StdRng::seed_from_u64(seed),
    )
    .with_config(run_config);
    let mut policy = StdRng::seed_from_u64(seed ^ POLICY_SEED_SALT);

    session.start_run_with("Simulator", &config.class_id, config.challenge.as_deref())?;

    for _ in 0..MAX_STEPS_PER_RUN {
        if let Some(run_end) = session.last_run() {
            return Ok(RunResult {
                summary: run_end.summary.clone(),
                new_achievements: run_end.new_achievements.len(),
            });
        }

        if let Some(question) = session.pending_question() {
            // Single-option questions can only be answered correctly.
            let answer = if policy.gen_bool(config.accuracy) || question.options.len() < 2 {
                question.correct_answer
            } else {
                (question.correct_answer + 1) % question.options.len()
            };
            session.answer_question(answer)?;
            continue;
        }

        if let Some(perk) = session.perk_choices().first().cloned() {
            session.select_perk(&perk.id)?;
            continue;
        }

        let low_on_lives = session
            .character()
            .is_some_and(|c| c.lives() == 1 && !c.inventory().is_empty());
        if low_on_lives {
            session.use_item(0)?;
            continue;
        }

        let floor_done = session
            .state()
            .is_some_and(|state| state.check_floor_completion());
        if floor_done {
            if let FloorProgress::RunEnded(run_end) = session.continue_after_node()? {
                return Ok(RunResult {
                    new_achievements: run_end.new_achievements.len(),
                    summary: run_end.summary,
                });
            }
            continue;
        }

        let node_id = session
            .available_nodes()
            .choose(&mut policy)
            .map(|node| node.id.clone())
            .ok_or_else(|| {
                SimError::Stuck(session.state().map_or(0, |state| state.current_floor()))
            })?;
        session.visit_node(&node_id)?;
    }

    tracing::warn!("Run with seed {} hit the step limit", seed);
    session
        .end_run_if_defeated()
        .map(|run_end| RunResult {
            new_achievements: run_end.new_achievements.len(),
            summary: run_end.summary,
        })
        .ok_or(SimError::StepLimit)
}

// ── Output ───────────────────────────────────────────────────────────

fn print_run(seed: u64, summary: &RunSummary) {
    println!(
        "seed {:>6}  {:<7} floor {:>2}  score {:>5}  lvl {:>2}  acc {:>5.1}%  streak {:>2}  {:?}",
        seed,
        if summary.success { "WON" } else { "LOST" },
        summary.floor_reached,
        summary.final_score,
        summary.level,
        summary.accuracy() * 100.0,
        summary.best_streak,
        summary.statistics.play_style,
    );
}

fn print_summary(config: &SimConfig, stats: &SimStats, errors: u32) {
    let win_rate = stats.mean(stats.wins as f64) * 100.0;
    if config.quiet {
        println!(
            "runs={} wins={} win_rate={:.1}% avg_score={:.0} avg_floor={:.2} errors={}",
            stats.runs,
            stats.wins,
            win_rate,
            stats.mean(stats.total_score as f64),
            stats.mean(stats.total_floor as f64),
            errors
        );
        return;
    }

    println!();
    println!("── Summary ─────────────────────────────────────────");
    println!(
        "Class: {}  Challenge: {}  Floors: {}  Accuracy: {:.0}%",
        config.class_id,
        config.challenge.as_deref().unwrap_or("none"),
        config.floors,
        config.accuracy * 100.0
    );
    println!("Runs:          {} ({} errors)", stats.runs, errors);
    println!("Wins:          {} ({:.1}%)", stats.wins, win_rate);
    println!(
        "Score:         avg {:.0}, best {}",
        stats.mean(stats.total_score as f64),
        stats.best_score
    );
    println!("Floor reached: avg {:.2}", stats.mean(stats.total_floor as f64));
    println!("Level:         avg {:.2}", stats.mean(stats.total_level as f64));
    println!(
        "Accuracy:      avg {:.1}%",
        stats.mean(stats.total_accuracy) * 100.0
    );
    println!("Best streak:   {}", stats.best_streak);
    println!("Achievements:  {}", stats.achievements_unlocked);

    if !stats.defeats_by_floor.is_empty() {
        println!();
        println!("Defeats by floor:");
        for (floor, count) in &stats.defeats_by_floor {
            println!("  {:>2}: {}", floor, count);
        }
    }

    println!();
    println!("Node visits:");
    for (node_type, count) in &stats.visits_by_type {
        println!("  {:<10} {}", node_type.name(), count);
    }

    println!();
    println!("Play styles:");
    for (style, count) in &stats.play_styles {
        println!("  {:<10} {}", style, count);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = parse_args();
    let content_dir = match (&config.catalog_dir, config.user_content) {
        (Some(dir), _) => Some(dir.clone()),
        (None, true) => match catalog::default_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                eprintln!("Could not locate the content directory: {e}");
                std::process::exit(1);
            }
        },
        (None, false) => None,
    };
    let (catalog, questions) = match &content_dir {
        Some(dir) => (
            Catalog::load_from_dir(dir),
            QuestionBank::load_from_dir(dir, Box::new(UnseenFirstSelector)),
        ),
        None => (Catalog::builtin(), QuestionBank::builtin()),
    };
    let catalog = Arc::new(catalog);
    let questions = Arc::new(questions);

    let mut stats = SimStats::default();
    let mut errors = 0;
    for run in 0..config.runs {
        let seed = config.seed.wrapping_add(run as u64);
        match run_simulation(&config, &catalog, &questions, seed) {
            Ok(result) => {
                if config.verbose && !config.quiet {
                    print_run(seed, &result.summary);
                }
                stats.record(&result.summary, result.new_achievements);
            }
            Err(e) => {
                errors += 1;
                eprintln!("Run with seed {seed} failed: {e}");
                if matches!(
                    e,
                    SimError::Game(GameError::UnknownClass(_) | GameError::UnknownChallengeMode(_))
                ) {
                    std::process::exit(1);
                }
            }
        }
    }

    print_summary(&config, &stats, errors);
}
