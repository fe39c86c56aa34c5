//! Daemon runtime -- assembly, reload handling, and lifecycle management.
//!
//! The [`Runtime`] wires the configuration, the built-in plugin registry,
//! and the monitor pipeline together. It owns the watch channels through
//! which the active rule/plugin set and the shutdown signal reach the
//! dispatcher, and it translates OS signals into channel updates:
//!
//! * `SIGINT` / ctrl-c -- graceful shutdown (the current line finishes)
//! * `SIGHUP` (unix) -- reload spam lists and plugin activation

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use spamcull_core::{PluginRegistry, SpamcullConfig};
use spamcull_monitor::{ActiveSet, DispatchStats, Dispatcher, MonitorSettings, RuleSet, SpamLists};

use crate::plugins::builtin_registry;

/// The daemon runtime.
pub struct Runtime {
    config: SpamcullConfig,
    settings: MonitorSettings,
    registry: PluginRegistry,
    active_tx: watch::Sender<ActiveSet>,
    shutdown_tx: watch::Sender<bool>,
}

impl Runtime {
    /// Build the runtime from a validated configuration.
    pub fn new(config: SpamcullConfig) -> Result<Self> {
        let settings = MonitorSettings::from_core(&config);
        let registry = builtin_registry(&config).context("failed to build plugin registry")?;
        let (active_tx, _) = watch::channel(ActiveSet::default());
        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            config,
            settings,
            registry,
            active_tx,
            shutdown_tx,
        })
    }

    /// Sender half of the shutdown channel, for tests and embedding.
    pub fn shutdown_handle(&self) -> watch::Sender<bool> {
        self.shutdown_tx.clone()
    }

    /// Load spam lists, compile rules, and activate enabled plugins.
    async fn build_active_set(&self) -> Result<ActiveSet> {
        let lists = SpamLists::load(&self.settings.host_list, &self.settings.handle_list)
            .await
            .context("failed to load spam lists")?;
        let rules = RuleSet::compile(&lists).context("failed to compile rule set")?;
        let plugins = self.registry.activate(&self.config.plugins.enabled);
        if plugins.is_empty() {
            warn!("no plugins active, detections will only be logged");
        }
        Ok(ActiveSet {
            rules: Arc::new(rules),
            plugins,
        })
    }

    /// Rebuild the active set and swap it in wholesale.
    ///
    /// On failure the previously active set stays in effect.
    pub async fn reload(&self) -> Result<()> {
        let active = self.build_active_set().await?;
        info!(plugins = ?active.plugins.names(), "configuration reloaded");
        self.active_tx.send_replace(active);
        Ok(())
    }

    /// Run the daemon until shutdown or a fatal monitor error.
    pub async fn run(&self) -> Result<DispatchStats> {
        let active = self.build_active_set().await?;
        info!(plugins = ?active.plugins.names(), "initial active set ready");
        self.active_tx.send_replace(active);

        let dispatcher = Dispatcher::new(
            &self.settings,
            self.active_tx.subscribe(),
            self.shutdown_tx.subscribe(),
        )
        .context("failed to build dispatcher")?;
        let mut task = tokio::spawn(dispatcher.run());

        #[cfg(unix)]
        let mut sighup =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())
                .context("failed to install SIGHUP handler")?;

        loop {
            #[cfg(unix)]
            {
                tokio::select! {
                    result = &mut task => {
                        return finish(result);
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        let _ = self.shutdown_tx.send(true);
                        return finish(task.await);
                    }
                    _ = sighup.recv() => {
                        info!("reload signal received");
                        if let Err(e) = self.reload().await {
                            error!(error = %e, "reload failed, keeping previous rules");
                        }
                    }
                }
            }
            #[cfg(not(unix))]
            {
                tokio::select! {
                    result = &mut task => {
                        return finish(result);
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        let _ = self.shutdown_tx.send(true);
                        return finish(task.await);
                    }
                }
            }
        }
    }
}

fn finish(
    result: std::result::Result<
        std::result::Result<DispatchStats, spamcull_monitor::MonitorError>,
        tokio::task::JoinError,
    >,
) -> Result<DispatchStats> {
    let stats = result
        .context("dispatcher task panicked")?
        .context("monitor pipeline failed")?;
    info!(
        lines = stats.lines_processed,
        detections = stats.detections_dispatched,
        "daemon shut down"
    );
    Ok(stats)
}
