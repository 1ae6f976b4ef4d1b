//! Lockstep CLI
//!
//! Runs built-in demo scenarios or an interactive simulation driven from
//! standard input, and renders the resulting tick log.

use clap::{Parser, Subcommand};

mod render;
mod scenario;
mod stdin_input;

#[derive(Parser)]
#[command(name = "lockstep")]
#[command(about = "Discrete-time cooperative multitasking simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in demo scenario and print its tick log
    Demo {
        /// Scenario name: sequence, delay, parallel, queue, conduction
        name: String,
        /// Halt bound in ticks
        #[arg(long, default_value_t = 10)]
        halt: u64,
        /// Sleep between ticks, in milliseconds (0 = unpaced)
        #[arg(long, default_value_t = 0)]
        pace_ms: u64,
        /// Dump the log as JSON instead of the tick listing
        #[arg(long)]
        json: bool,
    },

    /// Drive counter tasks interactively from stdin
    ///
    /// Each tick reads one line naming a target pid (empty line for none)
    /// and one line of whitespace-separated signal tokens. Tasks hold state
    /// "0" and terminate on the signal "1".
    Run {
        /// Number of counter tasks to spawn
        #[arg(long, default_value_t = 1)]
        tasks: u64,
        /// Halt bound in ticks
        #[arg(long, default_value_t = 10)]
        halt: u64,
        /// Sleep between ticks, in milliseconds (0 = unpaced)
        #[arg(long, default_value_t = 0)]
        pace_ms: u64,
        /// Dump the log as JSON instead of the tick listing
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            name,
            halt,
            pace_ms,
            json,
        } => scenario::demo(&name, halt, pace_ms, json),
        Commands::Run {
            tasks,
            halt,
            pace_ms,
            json,
        } => scenario::interactive(tasks, halt, pace_ms, json),
    }
}
