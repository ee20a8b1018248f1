//! API Key Store
//!
//! Central store for plugin API keys, loaded from the environment variables
//! each plugin declares. The store is built once during startup and shared
//! read-only; plugins receive it through their construction context and the
//! scheduler consults it to decide whether a plugin is configured.

use crate::plugin::types::{ApiKeyRequirement, PluginMetadata};
use std::collections::HashMap;

/// Read-only collection of resolved API keys, indexed by key name
#[derive(Debug, Default)]
pub struct ApiKeyStore {
    keys: HashMap<String, String>,
}

impl ApiKeyStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve the given requirements against the process environment
    ///
    /// Empty values are treated as absent, so `EXPORT FOO=` does not count
    /// as configuration.
    pub fn from_env<'a>(requirements: impl IntoIterator<Item = &'a ApiKeyRequirement>) -> Self {
        let mut keys = HashMap::new();
        for req in requirements {
            if let Ok(value) = std::env::var(&req.env_var) {
                let value = value.trim().to_string();
                if !value.is_empty() {
                    keys.insert(req.key_name.clone(), value);
                }
            }
        }
        Self { keys }
    }

    /// Insert a key directly, bypassing the environment
    pub fn with_key(mut self, key_name: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.insert(key_name.into(), value.into());
        self
    }

    pub fn get(&self, key_name: &str) -> Option<&str> {
        self.keys.get(key_name).map(String::as_str)
    }

    pub fn has(&self, key_name: &str) -> bool {
        self.keys.contains_key(key_name)
    }

    /// Whether every required key of this plugin is present
    ///
    /// Plugins with no required keys are always configured.
    pub fn is_configured(&self, metadata: &PluginMetadata) -> bool {
        self.missing_keys(metadata).is_empty()
    }

    /// Names of required keys this plugin is missing, in declaration order
    pub fn missing_keys(&self, metadata: &PluginMetadata) -> Vec<String> {
        metadata
            .api_key_requirements
            .iter()
            .filter(|req| req.is_required && !self.has(&req.key_name))
            .map(|req| req.key_name.clone())
            .collect()
    }

    /// Masked rendering for status output: all but the last four characters
    /// are hidden
    pub fn masked(&self, key_name: &str) -> Option<String> {
        self.get(key_name).map(|value| {
            let tail: String = value
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("***{}", tail)
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
