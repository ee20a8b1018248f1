//! Plugin System Module
//!
//! Trait-based plugin interface with compile-time registration. Plugins
//! declare their capabilities through metadata and receive shared services
//! (HTTP client, API keys) at construction time.

// Internal modules - all access should go through api module
pub(crate) mod builtin;
pub(crate) mod context;
pub(crate) mod discovery;
pub(crate) mod error;
pub(crate) mod keys;
pub(crate) mod registry;
pub(crate) mod traits;
pub(crate) mod types;

// Public API module - the only public interface for the plugin system
pub mod api;
