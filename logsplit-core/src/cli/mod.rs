pub mod config;
pub mod counters;


use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Validate configuration, print the resolved settings and exit
    Check {
        /// Path to the config file
        path: Option<PathBuf>,
    },
}
