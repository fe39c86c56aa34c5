//! CLI argument definitions for spamcull-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Spamcull chat spam monitoring daemon.
///
/// Tails the game client log, matches chat lines against configured
/// spam rules, and dispatches detections to enabled plugins.
#[derive(Parser, Debug)]
#[command(name = "spamcull-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to spamcull.toml configuration file.
    #[arg(short, long, default_value = "spamcull.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the monitored log file path.
    #[arg(long)]
    pub log_path: Option<PathBuf>,

    /// Read the monitored file from the beginning instead of its end.
    #[arg(long)]
    pub from_start: bool,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Apply CLI overrides onto a loaded configuration.
    pub fn apply_to(&self, config: &mut spamcull_core::SpamcullConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(path) = &self.log_path {
            config.monitor.log_path = path.display().to_string();
        }
        if self.from_start {
            config.monitor.read_from_start = true;
        }
    }
}
