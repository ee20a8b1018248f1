//! Plugin Discovery System
//!
//! Collects the builtin plugins registered through the `builtin!` macro,
//! applies user exclusions, and feeds the survivors into a registry. All
//! plugins are compiled in; there is no external plugin loading.

use crate::plugin::error::RegistrationError;
use crate::plugin::registry::PluginRegistry;
use crate::plugin::types::DiscoveredPlugin;

/// Configuration for plugin discovery
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Plugins to exclude from discovery
    pub excluded_plugins: Vec<String>,
}

/// Plugin discovery with exclusion filtering
pub struct PluginDiscovery {
    config: DiscoveryConfig,
}

impl PluginDiscovery {
    pub fn new() -> Self {
        Self {
            config: DiscoveryConfig::default(),
        }
    }

    /// Create plugin discovery with exclusions
    pub fn with_excludes(excludes: Vec<String>) -> Self {
        Self {
            config: DiscoveryConfig {
                excluded_plugins: excludes,
            },
        }
    }

    /// Discover all available plugins
    ///
    /// Exclusions that match no known plugin are reported at warn level so a
    /// typo in `--exclude-plugin` does not pass silently.
    pub fn discover_plugins(&self) -> Vec<DiscoveredPlugin> {
        let mut plugins = crate::plugin::builtin::api::get_all_builtin_plugins();
        log::debug!("Found {} builtin plugins", plugins.len());

        for excluded in &self.config.excluded_plugins {
            if !plugins.iter().any(|p| &p.metadata.name == excluded) {
                log::warn!("Excluded plugin '{}' does not exist", excluded);
            }
        }

        let before_exclusions = plugins.len();
        plugins.retain(|plugin| !self.config.excluded_plugins.contains(&plugin.metadata.name));
        if plugins.len() != before_exclusions {
            log::debug!(
                "After exclusions: {} plugins (was {})",
                plugins.len(),
                before_exclusions
            );
        }

        plugins
    }

    /// Discover and register everything, returning the number registered
    pub fn register_all(&self, registry: &mut PluginRegistry) -> Result<usize, RegistrationError> {
        let plugins = self.discover_plugins();
        let count = plugins.len();
        for plugin in plugins {
            log::debug!("Registering plugin '{}'", plugin.metadata.name);
            registry.register(plugin.metadata, plugin.factory)?;
        }
        Ok(count)
    }
}

impl Default for PluginDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::context::PluginContext;
    use crate::plugin::keys::ApiKeyStore;
    use std::sync::Arc;

    fn test_registry() -> PluginRegistry {
        let context = Arc::new(PluginContext::new(Arc::new(ApiKeyStore::empty())).unwrap());
        PluginRegistry::new(context)
    }

    #[test]
    fn test_discovery_finds_builtins() {
        let discovery = PluginDiscovery::new();
        let plugins = discovery.discover_plugins();

        let names: Vec<_> = plugins.iter().map(|p| p.metadata.name.as_str()).collect();
        assert!(names.contains(&"breach_watch"));
        assert!(names.contains(&"hash_inspect"));
        assert!(names.contains(&"ip_classify"));
        assert!(names.contains(&"mail_profile"));
        assert!(names.contains(&"phone_insight"));
    }

    #[test]
    fn test_exclusions_are_applied() {
        let discovery = PluginDiscovery::with_excludes(vec!["mail_profile".to_string()]);
        let plugins = discovery.discover_plugins();
        assert!(plugins.iter().all(|p| p.metadata.name != "mail_profile"));
    }

    #[test]
    fn test_register_all_populates_registry() {
        let discovery = PluginDiscovery::new();
        let mut registry = test_registry();

        let count = discovery.register_all(&mut registry).unwrap();
        assert_eq!(count, registry.len());
        assert!(registry.get("phone_insight").is_some());
    }

    #[test]
    fn test_registered_plugins_keep_discovery_order() {
        let discovery = PluginDiscovery::new();
        let mut registry = test_registry();
        discovery.register_all(&mut registry).unwrap();

        let registered: Vec<_> = registry.plugins().map(|m| m.name.clone()).collect();
        let mut sorted = registered.clone();
        sorted.sort();
        assert_eq!(registered, sorted, "builtin registration must be name-sorted");
    }
}
