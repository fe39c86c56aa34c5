//! Ignore list plugin -- collects spamming player names in a text file.
//!
//! The file holds one player name per line and can be pasted into the
//! game's `/ignore` command or consumed by external tooling. Names are
//! deduplicated against the existing file contents, so a player who
//! spams repeatedly is recorded once.

use std::collections::HashSet;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use spamcull_core::{Detection, PluginInfo, SpamPlugin, SpamcullError};

/// Plugin that appends newly seen spammer names to an ignore list file.
pub struct IgnoreListPlugin {
    info: PluginInfo,
    path: PathBuf,
    seen: Mutex<HashSet<String>>,
}

impl IgnoreListPlugin {
    /// Seeds the in-memory set from the existing file, if present.
    pub fn new(path: PathBuf) -> Self {
        let seen = match std::fs::read_to_string(&path) {
            Ok(contents) => contents
                .lines()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            Err(_) => HashSet::new(),
        };
        Self {
            info: PluginInfo::process_spam(
                "ignore_list",
                env!("CARGO_PKG_VERSION"),
                "records spammer player names for ignoring",
            ),
            path,
            seen: Mutex::new(seen),
        }
    }
}

impl SpamPlugin for IgnoreListPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    async fn process_spam(&self, detection: Detection) -> Result<(), SpamcullError> {
        // Detections from non-chat lines carry no player; nothing to ignore.
        let Some(player) = detection.player else {
            debug!(detection_id = %detection.id, "detection without player, skipping");
            return Ok(());
        };

        let mut seen = self.seen.lock().await;
        if !seen.insert(player.clone()) {
            debug!(player = %player, "player already on ignore list");
            return Ok(());
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{player}\n").as_bytes()).await?;
        file.flush().await?;

        info!(player = %player, path = %self.path.display(), "player added to ignore list");
        Ok(())
    }
}
