//! Quoridor-Zero command line.
//!
//! ## Usage
//!
//! - `quoridor-zero` - Show a demo
//! - `quoridor-zero demo` - Rollout MCTS against a random player
//! - `quoridor-zero protocol` - Serve the JSON line protocol on stdin/stdout
//! - `quoridor-zero match --first rollout --second random` - Evaluate two agents
//! - `quoridor-zero selfplay --games 8` - Generate self-play games

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use quoridor_zero::board::BoardState;
use quoridor_zero::config::{GameConfig, SearchConfig};
use quoridor_zero::constants::{
    C_PUCT, DEFAULT_MAX_TURNS, DEFAULT_SIZE, DEFAULT_WALLS, N_SIMS, TEMPERATURE,
};
use quoridor_zero::driver::MctsDriver;
use quoridor_zero::game::{
    evaluate_agents, play_match, Agent, GreedyAgent, MctsAgent, RandomAgent, RolloutAgent,
};
use quoridor_zero::logging::setup_logging;
use quoridor_zero::oracle::UniformOracle;
use quoridor_zero::protocol::ProtocolEngine;
use quoridor_zero::selfplay::{generate_self_play, SelfPlayBuffer};

/// Quoridor-Zero: a Quoridor MCTS engine
#[derive(Parser)]
#[command(name = "quoridor-zero")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Board side
    #[arg(long, global = true, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Walls per player
    #[arg(long, global = true, default_value_t = DEFAULT_WALLS)]
    walls: u32,

    /// Ply number at which a game is drawn
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_TURNS)]
    max_turns: u32,

    /// Simulations per oracle-guided decision
    #[arg(long, global = true, default_value_t = N_SIMS)]
    simulations: usize,

    /// Sampling temperature over visit counts (0 = most visited)
    #[arg(long, global = true, default_value_t = TEMPERATURE)]
    temperature: f32,

    /// PUCT exploration constant
    #[arg(long, global = true, default_value_t = C_PUCT)]
    cpuct: f32,

    /// Seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Write rotating log files here instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play rollout MCTS against a random player and show the board
    Demo,
    /// Serve the JSON line protocol on stdin/stdout
    Protocol {
        /// Player answering the human
        #[arg(long, value_enum, default_value_t = AgentKind::Rollout)]
        engine: AgentKind,
    },
    /// Evaluate two agents over a series of matches
    Match {
        #[arg(long, value_enum, default_value_t = AgentKind::Rollout)]
        first: AgentKind,
        #[arg(long, value_enum, default_value_t = AgentKind::Random)]
        second: AgentKind,
        #[arg(long, default_value_t = 10)]
        matches: usize,
    },
    /// Generate self-play games with the uniform oracle
    Selfplay {
        #[arg(long, default_value_t = 8)]
        games: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    /// Rollout MCTS, no oracle
    Rollout,
    /// Oracle-guided MCTS with a uniform oracle
    Uniform,
    /// Oracle policy argmax, no search
    Greedy,
    /// Random legal actions
    Random,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        GameConfig::new(self.size, self.walls, self.max_turns).context("invalid game settings")
    }

    fn search_config(&self) -> Result<SearchConfig> {
        let config = SearchConfig {
            cpuct: self.cpuct,
            ..SearchConfig::default()
        };
        config.validate().context("invalid search settings")?;
        Ok(config)
    }

    fn driver(&self, search: SearchConfig, offset: u64) -> Result<MctsDriver> {
        let driver = match self.seed {
            Some(seed) => MctsDriver::with_seed(search, seed.wrapping_add(offset))?,
            None => MctsDriver::new(search)?,
        };
        Ok(driver)
    }

    fn agent(&self, kind: AgentKind, offset: u64) -> Result<Box<dyn Agent>> {
        let search = self.search_config()?;
        let agent: Box<dyn Agent> = match kind {
            AgentKind::Rollout => Box::new(RolloutAgent::new(self.driver(search, offset)?)),
            AgentKind::Uniform => Box::new(MctsAgent::new(
                UniformOracle,
                self.driver(search, offset)?,
                self.simulations,
                self.temperature,
            )),
            AgentKind::Greedy => Box::new(GreedyAgent::new(UniformOracle)),
            AgentKind::Random => Box::new(match self.seed {
                Some(seed) => RandomAgent::with_seed(seed.wrapping_add(offset)),
                None => RandomAgent::new(),
            }),
        };
        Ok(agent)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = setup_logging(&cli.log_level, cli.log_dir.as_deref())
        .context("failed to start logging")?;

    match &cli.command {
        Some(Commands::Protocol { engine }) => {
            let mut server = ProtocolEngine::new(cli.game_config()?, cli.agent(*engine, 0)?);
            server
                .run(std::io::stdin().lock(), std::io::stdout())
                .context("protocol loop failed")?;
        }
        Some(Commands::Match {
            first,
            second,
            matches,
        }) => {
            let mut a = cli.agent(*first, 0)?;
            let mut b = cli.agent(*second, 1)?;
            let eval = evaluate_agents(a.as_mut(), b.as_mut(), *matches, cli.game_config()?)?;
            println!(
                "{} vs {}: {:.3} average over {} matches",
                a.name(),
                b.name(),
                eval.average,
                matches
            );
            println!("results: {:?}", eval.results);
        }
        Some(Commands::Selfplay { games }) => {
            let mut buffer = SelfPlayBuffer::new();
            generate_self_play(
                &UniformOracle,
                cli.search_config()?,
                cli.game_config()?,
                cli.simulations,
                cli.temperature,
                *games,
                cli.seed.unwrap_or_else(|| fastrand::u64(..)),
                &mut buffer,
            )?;
            println!(
                "{} games, {} positions, mean first seat point {:.3}",
                buffer.games(),
                buffer.len(),
                buffer.mean_result().unwrap_or(0.5)
            );
        }
        Some(Commands::Demo) | None => run_demo(&cli)?,
    }
    Ok(())
}

fn run_demo(cli: &Cli) -> Result<()> {
    println!("Quoridor-Zero: Quoridor MCTS Engine\n");

    let config = cli.game_config()?;
    println!("=== Empty board ===");
    let board = BoardState::new(config);
    println!("{board}");
    println!("{} legal actions\n", board.legal_actions().len());

    println!("=== Rollout MCTS (first) vs random (second) ===");
    let mut first = cli.agent(AgentKind::Rollout, 0)?;
    let mut second = cli.agent(AgentKind::Random, 1)?;
    let outcome = play_match(first.as_mut(), second.as_mut(), config)?;
    println!("{}", outcome.board);
    println!(
        "Finished after {} plies, first seat point {}",
        outcome.plies, outcome.point
    );
    info!("demo finished");
    Ok(())
}
