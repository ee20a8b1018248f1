//! Type definitions for the plugin system
//!
//! This module contains the core data structures used throughout
//! the plugin system for metadata, API key requirements, and discovery.

use crate::core::target::ScanType;
use serde::{Deserialize, Serialize};

/// Plugin metadata information
///
/// Everything the registry and scheduler need to know about a plugin without
/// running it: identity, the scan types it answers, the API keys it wants,
/// and its throttling/timeout envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Stable machine name, unique across the registry
    pub name: String,
    /// Human-readable name for tables and reports
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    /// API version this plugin was built against (YYYYMMDD)
    pub api_version: u32,
    pub category: PluginCategory,
    /// Scan types this plugin responds to
    pub supported_scan_types: Vec<ScanType>,
    /// API keys the plugin uses; only `is_required` ones gate configuration
    pub api_key_requirements: Vec<ApiKeyRequirement>,
    /// Upstream request budget; 0 means unthrottled
    pub rate_limit_per_minute: u32,
    /// Per-plugin scan deadline in seconds
    pub timeout_secs: u64,
    /// Names of other plugins this plugin builds on
    pub dependencies: Vec<String>,
}

impl PluginMetadata {
    /// Whether any of the declared API keys is required
    pub fn requires_keys(&self) -> bool {
        self.api_key_requirements.iter().any(|req| req.is_required)
    }

    pub fn supports(&self, scan_type: ScanType) -> bool {
        self.supported_scan_types.contains(&scan_type)
    }

    pub fn depends_on(&self, plugin_name: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == plugin_name)
    }
}

/// An API key a plugin declares it can use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRequirement {
    /// Key name used for lookup in the key store
    pub key_name: String,
    /// Environment variable the key is read from
    pub env_var: String,
    /// Human-readable name for the key status table
    pub display_name: String,
    pub description: String,
    /// Where to obtain the key
    pub signup_url: String,
    /// Required keys gate the plugin as unconfigured when absent;
    /// optional keys merely unlock extra lookups
    pub is_required: bool,
}

/// Plugin category classification
///
/// Declaration order is display order: grouped tables and reports list
/// categories in this sequence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
pub enum PluginCategory {
    #[strum(serialize = "Breach Detection")]
    #[serde(rename = "Breach Detection")]
    BreachDetection,
    #[strum(serialize = "IP Intelligence")]
    #[serde(rename = "IP Intelligence")]
    IpIntelligence,
    #[strum(serialize = "Identity Lookup")]
    #[serde(rename = "Identity Lookup")]
    IdentityLookup,
    #[strum(serialize = "Hash Lookup")]
    #[serde(rename = "Hash Lookup")]
    HashLookup,
    #[strum(serialize = "Phone Intelligence")]
    #[serde(rename = "Phone Intelligence")]
    PhoneIntelligence,
    #[strum(serialize = "Username Enumeration")]
    #[serde(rename = "Username Enumeration")]
    UsernameEnumeration,
    #[strum(serialize = "Custom")]
    Custom,
}

/// Factory signature plugins register with
///
/// Construction takes the shared context so plugins receive their service
/// handles explicitly instead of reaching for process globals.
pub type PluginFactory =
    std::sync::Arc<dyn Fn(&crate::plugin::context::PluginContext) -> Box<dyn crate::plugin::traits::Plugin> + Send + Sync>;

/// Discovery result pairing metadata with its construction mechanism
#[derive(Clone)]
pub struct DiscoveredPlugin {
    pub metadata: PluginMetadata,
    pub factory: PluginFactory,
}

impl std::fmt::Debug for DiscoveredPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveredPlugin")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}
