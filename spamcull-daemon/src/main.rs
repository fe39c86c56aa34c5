use anyhow::{Context, Result};
use clap::Parser;

use spamcull_core::{ConfigError, SpamcullConfig, SpamcullError};
use spamcull_daemon::cli::DaemonCli;
use spamcull_daemon::logging;
use spamcull_daemon::runtime::Runtime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let mut config = match SpamcullConfig::load(&cli.config).await {
        Ok(config) => config,
        Err(SpamcullError::Config(ConfigError::FileNotFound { .. })) => {
            eprintln!(
                "config file {} not found, using defaults",
                cli.config.display()
            );
            SpamcullConfig::default()
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to load config from {}", cli.config.display()));
        }
    };
    cli.apply_to(&mut config);
    config.validate().context("invalid configuration")?;

    if cli.validate {
        println!("configuration OK: {}", cli.config.display());
        return Ok(());
    }

    // Keep the guard alive for the lifetime of the daemon so the file
    // writer flushes on exit.
    let _log_guard = logging::init_tracing(&config.general)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        log_path = %config.monitor.log_path,
        "spamcull-daemon starting"
    );

    let runtime = Runtime::new(config)?;
    runtime.run().await?;

    Ok(())
}
