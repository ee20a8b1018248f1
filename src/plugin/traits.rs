//! Plugin Trait System
//!
//! The plugin contract is deliberately small: describe yourself, then scan.
//! Everything a plugin needs at runtime (HTTP transport, API keys) is handed
//! to its factory at construction time, so implementations hold their own
//! service handles instead of reaching for process globals.
//!
//! # Plugin Architecture
//!
//! The scheduler resolves plugins by scan type, constructs one instance per
//! scan session, and drives `scan` concurrently across plugins. Plugins
//! report progress through the provided handle and communicate failure by
//! returning an error; the scheduler converts failures into synthetic
//! findings rather than aborting the session.
//!
//! Plugins do NOT control scheduling, throttle themselves against the
//! per-plugin rate limit, or decide session status.

use crate::core::finding::Finding;
use crate::core::target::TargetDescriptor;
use crate::plugin::error::PluginResult;
use crate::plugin::types::PluginMetadata;
use crate::scanner::progress::ProgressHandle;

/// Base plugin trait that all plugins must implement
///
/// Both operations must be safe to call from any task: `metadata` is pure
/// (no I/O, stable output for a given build) and `scan` only borrows the
/// instance, so one instance can serve a whole session.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// Get plugin metadata
    ///
    /// Must not perform I/O; the registry calls this during validation and
    /// listing, before any scan is running.
    fn metadata(&self) -> PluginMetadata;

    /// Scan the target, reporting progress as a fraction in `[0.0, 1.0]`
    ///
    /// Implementations should report progress at natural checkpoints; the
    /// scheduler forces the task's slot to 1.0 on every terminal outcome, so
    /// a final `report(1.0)` is welcome but not required.
    async fn scan(
        &self,
        target: &TargetDescriptor,
        progress: ProgressHandle,
    ) -> PluginResult<Vec<Finding>>;
}
