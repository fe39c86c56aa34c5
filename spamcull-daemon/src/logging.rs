//! Logging initialization for spamcull-daemon.
//!
//! Configures `tracing-subscriber` based on the `[general]` section of
//! `SpamcullConfig`. Supports JSON structured logging, human-readable
//! pretty format, and an optional daily-rolling log file.

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use spamcull_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// When `log_dir` is set, log records are additionally written to a
/// daily-rolling `spamcull.log` in that directory; the returned guard
/// must be kept alive for the writer to flush.
pub fn init_tracing(config: &GeneralConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // The file layer is built per branch: its concrete type depends on
    // the console layer it is stacked onto, so a single binding cannot
    // serve both formats. Only the writer is shared.
    let (file_writer, guard) = if config.log_dir.is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&config.log_dir, "spamcull.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (Some(writer), Some(guard))
    };

    match config.log_format.as_str() {
        "json" => {
            let file_layer = file_writer.map(|writer| {
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
            });
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .with(file_layer)
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e)
                })?;
        }
        "pretty" => {
            let file_layer = file_writer.map(|writer| {
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
            });
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .with(file_layer)
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
                })?;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            ));
        }
    }

    Ok(guard)
}
