//! Xiangqi-Rust: a Chinese Chess engine.
//!
//! ## Usage
//!
//! - `xiangqi-rust` - Show a demo search
//! - `xiangqi-rust play` - Start an interactive session
//! - `xiangqi-rust demo` - Run the search demo
//!
//! `--sims` and `--seed` tune the engine for either mode.

use anyhow::Result;
use clap::{Parser, Subcommand};

use xiangqi_rust::board::{GameState, Side};
use xiangqi_rust::cli::Session;
use xiangqi_rust::constants::N_SIMS;
use xiangqi_rust::mcts::{SearchConfig, SearchTree};

/// Xiangqi-Rust: a Chinese Chess MCTS engine
#[derive(Parser)]
#[command(name = "xiangqi-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Simulations per engine move
    #[arg(long, default_value_t = N_SIMS)]
    sims: usize,

    /// Seed the search RNG for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine on the command line
    Play,
    /// Run a single search from the opening position and show its statistics
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SearchConfig {
        iterations: cli.sims,
        seed: cli.seed,
        ..SearchConfig::default()
    };

    match cli.command {
        Some(Commands::Play) => Session::new(config).run(),
        Some(Commands::Demo) | None => {
            run_demo(config);
            Ok(())
        }
    }
}

fn run_demo(config: SearchConfig) {
    println!("Xiangqi-Rust: Chinese Chess MCTS engine\n");

    let state = GameState::new();
    println!("{}\n", state.board);
    println!("Running {} simulations for {}...", config.iterations, Side::Red.name());

    let mut tree = SearchTree::new(state, config);
    match tree.run() {
        Some(mv) => {
            tree.dump_root();
            println!("Engine plays: {mv}");
        }
        None => println!("No legal move available"),
    }
}
