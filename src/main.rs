//! complect - scenario runner

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use complect::util::config::Config;
use complect::util::logger::{self, LogLevel};
use complect::{demo, run_scenario, NAME, VERSION};
use std::path::PathBuf;

/// Open algebraic data types with canonical instances
#[derive(Parser, Debug)]
#[command(name = "complect")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// RON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in scenarios
    Scenarios,

    /// Run one scenario and print its result
    Run {
        /// Scenario name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();

    logger::init_with_level(if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    });

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    }
    .with_env();

    match args.command {
        Commands::Scenarios => {
            for scenario in demo::scenarios() {
                println!("{:<10} {}", scenario.name, scenario.description);
            }
        }
        Commands::Run { name } => {
            let value =
                run_scenario(&name, config).with_context(|| format!("Failed to run: {}", name))?;
            println!("{}", value);
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}
