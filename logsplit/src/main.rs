use anyhow::Result;
use clap::{Parser, Subcommand};
use logsplit_core::cli::{self, ConfigCmd};
use logsplit_core::conf::load_config_or_default;
use logsplit_core::logging::init_logging;
use logsplit_core::server;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "logsplit",
    version,
    about = "Logsplit: fans a log stream out into per-severity structures"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the stream consumer (default)
    Run {
        /// Path to the logsplit config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Configuration tooling
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },

    /// Print the per-severity event counters
    Counters {
        /// Path to the logsplit config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = Cli::parse();

    match args.command {
        Some(Command::Config {
            cmd: ConfigCmd::Check { path },
        }) => {
            if let Err(e) = cli::config::check(path) {
                eprintln!("✘ {e:#}");
                return ExitCode::FAILURE;
            }
        }

        Some(Command::Counters { config, json }) => {
            if let Err(e) = cli::counters::run(config, json) {
                eprintln!("counters error: {e:#}");
                return ExitCode::FAILURE;
            }
        }

        Some(Command::Run { config }) => return run(config),

        None => return run(None),
    }

    ExitCode::SUCCESS
}

fn run(config: Option<PathBuf>) -> ExitCode {
    match start(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("logsplit error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn start(config: Option<PathBuf>) -> Result<()> {
    let cfg = load_config_or_default(config.as_deref())?;
    let _guard = init_logging(cfg.server.log_dir.as_deref());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting logsplit");
    server::run(cfg)
}
