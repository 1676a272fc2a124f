//! Gammon-Rust: a backgammon move engine.
//!
//! ## Usage
//!
//! - `gammon-rust` - Play a self-play game with the default strategies
//! - `gammon-rust moves --roll 3,1` - List the legal sequences for a roll
//! - `gammon-rust choose --roll 6,5 --strategy mcts` - Pick a move
//! - `gammon-rust selfplay --white mcts --black heuristic` - Play a full game

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info};

use gammon_rust::board::{Board, Color, format_sequence};
use gammon_rust::config::{EngineConfig, Strategy, StrategyConfig};
use gammon_rust::dice::Roll;
use gammon_rust::engine::{Engine, Game};
use gammon_rust::mcts::MctsConfig;
use gammon_rust::movegen::legal_move_sequences;
use gammon_rust::search::ExpectiminimaxConfig;

/// Gammon-Rust: a backgammon move engine
#[derive(Parser)]
#[command(name = "gammon-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every legal move sequence for a roll
    Moves {
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Choose a move with one of the strategies
    Choose {
        #[command(flatten)]
        position: PositionArgs,
        #[command(flatten)]
        search: SearchArgs,
        /// Strategy to use (defaults to the configured one)
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyKind>,
    },
    /// Play a full game between two strategies
    Selfplay {
        #[command(flatten)]
        search: SearchArgs,
        /// Strategy for White
        #[arg(long, value_enum)]
        white: Option<StrategyKind>,
        /// Strategy for Black
        #[arg(long, value_enum)]
        black: Option<StrategyKind>,
        /// Seed for the dice
        #[arg(long)]
        dice_seed: Option<u64>,
        /// Stop after this many turns (0 for no limit)
        #[arg(long)]
        max_turns: Option<usize>,
    },
}

#[derive(Args)]
struct PositionArgs {
    /// 28 comma-separated slot counts (defaults to the starting position)
    #[arg(short, long)]
    board: Option<Board>,
    /// Roll, e.g. 3,1
    #[arg(short, long)]
    roll: Roll,
    /// Side to move
    #[arg(long, default_value = "white")]
    color: Color,
}

#[derive(Args)]
struct SearchArgs {
    /// Expectiminimax depth
    #[arg(long)]
    depth: Option<usize>,
    /// Time budget per move in milliseconds
    #[arg(long)]
    budget_ms: Option<u64>,
    /// Seed for the random and MCTS strategies
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyKind {
    Random,
    Heuristic,
    Expectiminimax,
    Mcts,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet)?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Moves { position }) => run_moves(&position),
        Some(Commands::Choose {
            position,
            search,
            strategy,
        }) => {
            let base = config.for_color(position.color);
            let strategy = build_strategy(base, strategy, &search);
            run_choose(&position, strategy)
        }
        Some(Commands::Selfplay {
            search,
            white,
            black,
            dice_seed,
            max_turns,
        }) => {
            let mut config = config;
            config.white = build_strategy(&config.white, white, &search);
            config.black = build_strategy(&config.black, black, &search);
            config.dice_seed = dice_seed.unwrap_or(config.dice_seed);
            config.max_turns = max_turns.unwrap_or(config.max_turns);
            run_selfplay(&config)
        }
        None => run_selfplay(&config),
    }
}

fn init_logger(verbose: u8, quiet: bool) -> Result<()> {
    use simplelog::*;

    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)
        .context("failed to initialize logger")?;

    debug!("Logger successfully initialized");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = EngineConfig::from_toml_str(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Apply command-line overrides on top of a configured strategy.
fn build_strategy(
    base: &StrategyConfig,
    kind: Option<StrategyKind>,
    search: &SearchArgs,
) -> StrategyConfig {
    let mut config = base.clone();
    if let Some(kind) = kind {
        config.strategy = match kind {
            StrategyKind::Random => Strategy::Random,
            StrategyKind::Heuristic => Strategy::Heuristic,
            StrategyKind::Expectiminimax => {
                Strategy::Expectiminimax(ExpectiminimaxConfig::default())
            }
            StrategyKind::Mcts => Strategy::Mcts(MctsConfig::default()),
        };
    }
    match &mut config.strategy {
        Strategy::Expectiminimax(c) => {
            c.depth = search.depth.unwrap_or(c.depth);
            c.budget_ms = search.budget_ms.or(c.budget_ms);
        }
        Strategy::Mcts(c) => {
            c.budget_ms = search.budget_ms.unwrap_or(c.budget_ms);
            c.seed = search.seed.unwrap_or(c.seed);
        }
        Strategy::Random | Strategy::Heuristic => {}
    }
    config.seed = search.seed.or(config.seed);
    config
}

fn run_moves(position: &PositionArgs) -> Result<()> {
    let board = position.board.unwrap_or_default();
    let seqs = legal_move_sequences(&board, position.roll, position.color);
    if seqs.is_empty() {
        println!("pass");
    }
    for seq in &seqs {
        println!("{}", format_sequence(seq));
    }
    info!("{} legal sequences", seqs.len());
    Ok(())
}

fn run_choose(position: &PositionArgs, config: StrategyConfig) -> Result<()> {
    let board = position.board.unwrap_or_default();
    let mut engine = Engine::new(config).context("invalid strategy configuration")?;
    let seq = engine.choose_move(&board, position.roll, position.color);
    println!("{}", format_sequence(&seq));
    Ok(())
}

fn run_selfplay(config: &EngineConfig) -> Result<()> {
    let mut white = Engine::new(config.white.clone()).context("invalid white strategy")?;
    let mut black = Engine::new(config.black.clone()).context("invalid black strategy")?;
    let mut dice = fastrand::Rng::with_seed(config.dice_seed);
    let mut game = Game::new();

    while !game.is_over() && (config.max_turns == 0 || game.history().len() < config.max_turns) {
        let roll = Roll::random(&mut dice);
        let color = game.to_move();
        let engine = match color {
            Color::White => &mut white,
            Color::Black => &mut black,
        };
        let seq = game.play_turn(engine, roll)?;
        println!(
            "{:>3}. {:<5} {}  {}",
            game.history().len(),
            color,
            roll,
            format_sequence(&seq)
        );
    }

    println!("{}", game.board());
    match game.winner() {
        Some(winner) => println!("{winner} wins after {} turns", game.history().len()),
        None => println!("no winner after {} turns", game.history().len()),
    }
    Ok(())
}
