//! vswitch CLI - switch an installation between published versions
//!
//! This binary wires configuration, logging, prompts and progress bars
//! around the vswitch library.

mod commands;
mod context;
mod error;
mod logging;
mod progress;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::error;

use commands::config::ConfigCommands;
use commands::switch::SwitchArgs;
use context::Context;
use error::CliError;

#[derive(Parser)]
#[command(name = "vswitch")]
#[command(version, about = "Switch an installation between published versions", long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/vswitch/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Switch the installation to another version
    Switch(SwitchArgs),

    /// Print the installed version, identified from its files
    Detect,

    /// List published versions
    Versions,

    /// Show which variant of a file a version uses
    Resolve {
        /// Installation-relative file path
        file: String,

        /// Version to resolve against
        version: String,
    },

    /// Create the configuration file with default values
    Init {
        /// Installation directory (default: current directory)
        #[arg(long)]
        install: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(vswitch::config::config_file_path);

    let guard = match logging::init(&config_path, cli.verbose) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {}", e);
            None
        }
    };

    let ctx = Context::new(config_path);
    if let Err(e) = run(&ctx, cli.command) {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        drop(guard);
        process::exit(1);
    }
}

fn run(ctx: &Context, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Switch(args) => commands::switch::run(ctx, args),
        Commands::Detect => commands::detect::run(ctx),
        Commands::Versions => commands::versions::run(ctx),
        Commands::Resolve { file, version } => commands::resolve::run(ctx, &file, &version),
        Commands::Init { install, force } => commands::init::run(ctx, install, force),
        Commands::Config { command } => commands::config::run(ctx, command),
    }
}
