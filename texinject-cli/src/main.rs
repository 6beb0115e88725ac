//! TexInject CLI - Command-line interface
//!
//! Patches console-native textures into Unreal asset containers in place
//! and stages the patched container set for installation.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::inject::InjectArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "texinject", version, about = "Inject compiled textures into packed game assets in place")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert every texture in a container and write it back in place
    Inject(InjectArgs),

    /// List texture records without modifying the container
    Scan {
        /// Container to scan (.ucas or .pak)
        source: PathBuf,
    },

    /// Copy a container and its companion files under a new name
    Stage {
        /// Container whose set should be copied (.ucas or .pak)
        source: PathBuf,

        /// Destination directory (created if missing)
        dest: PathBuf,

        /// Filename prefix for the copied files
        prefix: String,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config { command } => commands::config::run(command),
        Commands::Inject(args) => {
            let runner = CliRunner::new(cli.verbose)?;
            runner.log_startup("inject");
            commands::inject::run(args, runner.config())
        }
        Commands::Scan { source } => {
            let runner = CliRunner::new(cli.verbose)?;
            runner.log_startup("scan");
            commands::scan::run(&source)
        }
        Commands::Stage {
            source,
            dest,
            prefix,
        } => {
            let runner = CliRunner::new(cli.verbose)?;
            runner.log_startup("stage");
            commands::stage::run(&source, &dest, &prefix)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(e.exit_code());
    }
}
