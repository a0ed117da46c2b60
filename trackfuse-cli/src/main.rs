//! trackfuse CLI - command-line driver for the collection service.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::common::{load_config, start_logging, ClassArg};
use commands::config::ConfigCommands;
use error::CliError;

#[derive(Parser)]
#[command(name = "trackfuse")]
#[command(about = "Multi-source aircraft and vessel position fusion", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: ~/.trackfuse/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll every enabled source on its interval until Ctrl-C
    Run,

    /// Run one collection cycle and print the fused records
    Once {
        /// Which entity class to collect
        #[arg(long, value_enum, default_value = "all")]
        class: ClassArg,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run one cycle of each class and print per-source health
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    let command = match cli.command {
        Commands::Config { command } => return commands::config::run(command, config_path),
        other => other,
    };

    let config = load_config(config_path)?;
    let _logging = start_logging(&config)?;

    match command {
        Commands::Run => commands::run::run(&config).await,
        Commands::Once { class, json } => commands::once::run(&config, class, json).await,
        Commands::Status { json } => commands::status::run(&config, json).await,
        Commands::Config { .. } => Ok(()),
    }
}
