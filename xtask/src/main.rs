// Desktop/tooling crate: unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod emulator;
mod step;
mod test;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Airwave radio development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the device build, the emulator build and the no_std crates
    Check,
    /// Run host tests
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration and property tests
        #[arg(long)]
        integration: bool,
    },
    /// Run the desktop emulator
    Emulator {
        /// Start on this station instead of the saved one
        #[arg(long)]
        station: Option<usize>,
        /// Fail every N-th source open
        #[arg(long)]
        fail_every: Option<u32>,
        /// Build in release mode
        #[arg(short, long)]
        release: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::Emulator {
            station,
            fail_every,
            release,
        } => emulator::run(station, fail_every, release),
    }
}
