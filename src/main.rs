//! Yun CLI - play example matches and run self-play from the command line.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Yun - charge / attack / defend duel engine
#[derive(Parser, Debug)]
#[command(name = "yun")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log verbosity: -v for debug, -vv for trace (RUST_LOG overrides)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a single match and print every round
    Run {
        #[command(flatten)]
        game: cli::GameArgs,

        /// Agent policy: `uniform` or a JSON weight table file
        #[arg(long, default_value = "uniform")]
        agent: String,

        /// Opponent policy: `uniform` or a JSON weight table file
        #[arg(long, default_value = "uniform")]
        opponent: String,

        /// How table policies pick actions
        #[arg(short, long, default_value = "sample")]
        mode: cli::ModeArg,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Run many matches between two policies and report the mean reward
    Selfplay {
        #[command(flatten)]
        game: cli::GameArgs,

        /// Agent policy: `uniform` or a JSON weight table file
        #[arg(long, default_value = "uniform")]
        policy: String,

        /// Opponent policy (default: same as --policy)
        #[arg(long)]
        opponent: Option<String>,

        /// How table policies pick actions
        #[arg(short, long, default_value = "sample")]
        mode: cli::ModeArg,

        /// Number of matches to play (default: 5000)
        #[arg(short, long, default_value = "5000")]
        games: u64,

        /// Starting seed (increments for each match)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },
}

/// Install the stderr log subscriber.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Run {
            game,
            agent,
            opponent,
            mode,
            seed,
            format,
        } => cli::run::execute(&game, &agent, &opponent, mode, seed, format),

        Commands::Selfplay {
            game,
            policy,
            opponent,
            mode,
            games,
            seed,
            threads,
            format,
            progress,
        } => cli::selfplay::execute(
            &game,
            &policy,
            opponent.as_deref(),
            mode,
            games,
            seed,
            threads,
            format,
            progress,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
