//! JSONL report plugin -- appends each detection to a report file.
//!
//! One JSON object per line, so the report can be tailed, grepped, or
//! loaded with standard tooling while the daemon keeps appending.

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use spamcull_core::{Detection, PluginInfo, SpamPlugin, SpamcullError};

/// Plugin that persists detections as JSON lines.
pub struct JsonlReportPlugin {
    info: PluginInfo,
    path: PathBuf,
    // Serializes appends so concurrent detections cannot interleave lines.
    write_lock: Mutex<()>,
}

impl JsonlReportPlugin {
    pub fn new(path: PathBuf) -> Self {
        Self {
            info: PluginInfo::process_spam(
                "jsonl_report",
                env!("CARGO_PKG_VERSION"),
                "appends detections to a JSONL report file",
            ),
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Report file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SpamPlugin for JsonlReportPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    async fn process_spam(&self, detection: Detection) -> Result<(), SpamcullError> {
        let mut line = serde_json::to_string(&detection).map_err(|e| {
            SpamcullError::Plugin(spamcull_core::PluginError::Invocation {
                name: self.info.name.clone(),
                reason: format!("serialize failed: {e}"),
            })
        })?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), detection_id = %detection.id, "detection reported");
        Ok(())
    }
}
