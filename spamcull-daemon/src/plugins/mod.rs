//! Built-in spam handling plugins.
//!
//! Each plugin implements [`SpamPlugin`] for the `process_spam` trigger.
//! Which plugins actually run is decided by `[plugins].enabled` in the
//! configuration; everything here is registered unconditionally and
//! activated by name.

mod echo;
mod ignore_list;
mod jsonl_report;

pub use echo::EchoPlugin;
pub use ignore_list::IgnoreListPlugin;
pub use jsonl_report::JsonlReportPlugin;

use std::sync::Arc;

use anyhow::Result;

use spamcull_core::{PluginRegistry, SpamcullConfig};

/// Build the registry of built-in plugins from configuration.
pub fn builtin_registry(config: &SpamcullConfig) -> Result<PluginRegistry> {
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(EchoPlugin::new()))?;
    registry.register(Arc::new(JsonlReportPlugin::new(
        config.plugins.report_path.clone().into(),
    )))?;
    registry.register(Arc::new(IgnoreListPlugin::new(
        config.plugins.ignore_list_path.clone().into(),
    )))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_holds_all_builtins() {
        let registry = builtin_registry(&SpamcullConfig::default()).unwrap();
        assert_eq!(registry.count(), 3);
        let infos = registry.list();
        assert!(infos.iter().any(|i| i.name == "echo"));
        assert!(infos.iter().any(|i| i.name == "jsonl_report"));
        assert!(infos.iter().any(|i| i.name == "ignore_list"));
    }
}
