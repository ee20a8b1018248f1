//! API for builtin plugin registration and discovery
//!
//! This module provides the dynamic registration system for builtin plugins.
//! Plugins use the `builtin!` macro to register themselves for automatic discovery.

use crate::plugin::types::DiscoveredPlugin;
use inventory;

/// Entry for a builtin plugin in the dynamic registry
pub struct BuiltinPluginEntry {
    pub entry: fn() -> DiscoveredPlugin,
}

// Collect all builtin plugin entries
inventory::collect!(BuiltinPluginEntry);

/// Macro for registering builtin plugins
///
#[macro_export]
macro_rules! builtin {
    ($entry_expr:expr) => {
        inventory::submit!($crate::plugin::builtin::api::BuiltinPluginEntry {
            entry: $entry_expr
        });
    };
}

/// Get all registered builtin plugins
///
/// Link order is not a contract, so entries are sorted by plugin name to
/// keep discovery (and with it dispatch order) deterministic across builds.
pub fn get_all_builtin_plugins() -> Vec<DiscoveredPlugin> {
    let mut plugins: Vec<DiscoveredPlugin> = inventory::iter::<BuiltinPluginEntry>()
        .map(|entry| (entry.entry)())
        .collect();
    plugins.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
    plugins
}
