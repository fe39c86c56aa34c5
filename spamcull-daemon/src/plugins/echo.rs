//! Echo plugin -- logs every detection it receives.
//!
//! Mainly useful while tuning rules: it makes detections visible in the
//! daemon log without any side effects.

use tracing::info;

use spamcull_core::{Detection, PluginInfo, SpamPlugin, SpamcullError};

/// Plugin that logs detections and does nothing else.
pub struct EchoPlugin {
    info: PluginInfo,
}

impl EchoPlugin {
    pub fn new() -> Self {
        Self {
            info: PluginInfo::process_spam(
                "echo",
                env!("CARGO_PKG_VERSION"),
                "logs detections to the daemon log",
            ),
        }
    }
}

impl Default for EchoPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl SpamPlugin for EchoPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    async fn process_spam(&self, detection: Detection) -> Result<(), SpamcullError> {
        info!(
            detection_id = %detection.id,
            rule = %detection.rule,
            severity = %detection.severity,
            player = detection.player.as_deref().unwrap_or("-"),
            matched = ?detection.matched,
            "echo: spam detection"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spamcull_core::{LogLine, RuleKind};

    #[tokio::test]
    async fn echo_never_fails() {
        let plugin = EchoPlugin::new();
        let line = LogLine::new("spam text".to_string(), 0);
        let detection = Detection::new(RuleKind::Url, vec!["xyz.com".into()], &line);
        assert!(plugin.process_spam(detection).await.is_ok());
    }

    #[test]
    fn echo_uses_process_spam_trigger() {
        let plugin = EchoPlugin::new();
        assert_eq!(plugin.info().trigger, "process_spam");
    }
}
