//! Plugin Registry
//!
//! Owns the set of registered plugins for one process. Registration order is
//! preserved and is the order `resolve` returns matches in, which in turn
//! fixes the dispatch order of a scan session. The registry is built mutable
//! during startup, then frozen behind an `Arc` for the scheduler.

use crate::core::target::ScanType;
use crate::plugin::context::PluginContext;
use crate::plugin::error::RegistrationError;
use crate::plugin::traits::Plugin;
use crate::plugin::types::{ApiKeyRequirement, PluginFactory, PluginMetadata};
use crate::scanner::rate_limit::RateLimiter;
use std::collections::HashSet;
use std::sync::Arc;

struct PluginEntry {
    metadata: PluginMetadata,
    factory: PluginFactory,
    // Shared by every scan of this plugin, so the per-minute budget holds
    // across concurrent sessions.
    limiter: Arc<RateLimiter>,
}

/// A registry match, ready for dispatch
pub struct ResolvedPlugin {
    pub metadata: PluginMetadata,
    pub instance: Box<dyn Plugin>,
    pub limiter: Arc<RateLimiter>,
}

pub struct PluginRegistry {
    context: Arc<PluginContext>,
    system_api_version: u32,
    entries: Vec<PluginEntry>,
    names: HashSet<String>,
}

impl PluginRegistry {
    pub fn new(context: Arc<PluginContext>) -> Self {
        Self::with_api_version(context, crate::core::version::get_api_version())
    }

    /// Registry with an explicit system API version (test seam)
    pub fn with_api_version(context: Arc<PluginContext>, system_api_version: u32) -> Self {
        Self {
            context,
            system_api_version,
            entries: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Register a plugin under its metadata
    ///
    /// Metadata is validated up front so a misdeclared plugin fails loudly at
    /// startup instead of surfacing mid-scan.
    pub fn register(
        &mut self,
        metadata: PluginMetadata,
        factory: PluginFactory,
    ) -> Result<(), RegistrationError> {
        validate_metadata(&metadata)?;

        if metadata.api_version > self.system_api_version {
            return Err(RegistrationError::VersionIncompatible {
                plugin_name: metadata.name.clone(),
                plugin_api: metadata.api_version,
                system_api: self.system_api_version,
            });
        }

        if !self.names.insert(metadata.name.clone()) {
            return Err(RegistrationError::DuplicateName {
                plugin_name: metadata.name.clone(),
            });
        }

        let limiter = Arc::new(RateLimiter::new(metadata.rate_limit_per_minute));
        self.entries.push(PluginEntry {
            metadata,
            factory,
            limiter,
        });
        Ok(())
    }

    /// All plugins supporting `scan_type`, in registration order
    ///
    /// Each call constructs fresh instances; an unknown or unserved scan type
    /// yields an empty list, which the scheduler treats as an immediately
    /// complete session.
    pub fn resolve(&self, scan_type: ScanType) -> Vec<ResolvedPlugin> {
        self.entries
            .iter()
            .filter(|entry| entry.metadata.supports(scan_type))
            .map(|entry| ResolvedPlugin {
                metadata: entry.metadata.clone(),
                instance: (entry.factory)(&self.context),
                limiter: entry.limiter.clone(),
            })
            .collect()
    }

    /// Metadata of every registered plugin, in registration order
    pub fn plugins(&self) -> impl Iterator<Item = &PluginMetadata> {
        self.entries.iter().map(|entry| &entry.metadata)
    }

    pub fn get(&self, name: &str) -> Option<&PluginMetadata> {
        self.entries
            .iter()
            .map(|entry| &entry.metadata)
            .find(|metadata| metadata.name == name)
    }

    /// Distinct API key requirements across all plugins, first declaration
    /// wins, registration order preserved
    pub fn key_requirements(&self) -> Vec<&ApiKeyRequirement> {
        let mut seen = HashSet::new();
        let mut requirements = Vec::new();
        for entry in &self.entries {
            for req in &entry.metadata.api_key_requirements {
                if seen.insert(req.key_name.as_str()) {
                    requirements.push(req);
                }
            }
        }
        requirements
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_metadata(metadata: &PluginMetadata) -> Result<(), RegistrationError> {
    let fail = |reason: &str| {
        Err(RegistrationError::InvalidMetadata {
            plugin_name: metadata.name.clone(),
            reason: reason.to_string(),
        })
    };

    if metadata.name.is_empty() {
        return fail("name must not be empty");
    }
    if metadata
        .name
        .chars()
        .any(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '_')
    {
        return fail("name must be lowercase alphanumeric with underscores");
    }
    if metadata.display_name.trim().is_empty() {
        return fail("display_name must not be empty");
    }
    if metadata.supported_scan_types.is_empty() {
        return fail("at least one supported scan type is required");
    }
    if metadata.api_version == 0 {
        return fail("api_version must be set");
    }
    if metadata.timeout_secs == 0 {
        return fail("timeout_secs must be positive");
    }
    Ok(())
}
