//! Public API for the plugin system
//!
//! This module provides the complete public API for the plugin system.
//! External modules should import from here rather than directly from
//! internal modules.

// Plugin contract
pub use crate::plugin::traits::Plugin;

// Error handling
pub use crate::plugin::error::{PluginError, PluginResult, RegistrationError};

// Plugin metadata and information
pub use crate::plugin::types::{
    ApiKeyRequirement, DiscoveredPlugin, PluginCategory, PluginFactory, PluginMetadata,
};

// Construction context and API keys
pub use crate::plugin::context::PluginContext;
pub use crate::plugin::keys::ApiKeyStore;

// Plugin registry
pub use crate::plugin::registry::{PluginRegistry, ResolvedPlugin};

// Plugin discovery
pub use crate::plugin::discovery::{DiscoveryConfig, PluginDiscovery};
