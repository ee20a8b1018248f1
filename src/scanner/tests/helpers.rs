//! Test helper functions for scanner unit tests
//!
//! Mock plugins with scripted behavior, registry and scheduler fixtures, and
//! target builders. These helpers are separate from integration test helpers
//! in tests/common/ since unit tests and integration tests run in different
//! contexts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::finding::{Finding, ThreatLevel};
use crate::core::target::{ScanType, TargetDescriptor};
use crate::plugin::context::PluginContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::keys::ApiKeyStore;
use crate::plugin::registry::PluginRegistry;
use crate::plugin::traits::Plugin;
use crate::plugin::types::{ApiKeyRequirement, PluginCategory, PluginMetadata};
use crate::scanner::progress::ProgressHandle;
use crate::scanner::scheduler::ScanScheduler;

/// Scripted behavior for a [`MockPlugin`]
#[derive(Clone)]
pub enum MockBehavior {
    /// Return these findings after `delay`
    Succeed {
        findings: Vec<Finding>,
        delay: Duration,
    },
    /// Return a generic error after `delay`
    Fail { message: String, delay: Duration },
    /// Never return; only cancellation or a deadline ends the task
    Hang,
}

/// Plugin whose scan follows a scripted behavior
pub struct MockPlugin {
    metadata: PluginMetadata,
    behavior: MockBehavior,
}

#[async_trait]
impl Plugin for MockPlugin {
    fn metadata(&self) -> PluginMetadata {
        self.metadata.clone()
    }

    async fn scan(
        &self,
        _target: &TargetDescriptor,
        progress: ProgressHandle,
    ) -> PluginResult<Vec<Finding>> {
        progress.report(0.1);
        match self.behavior.clone() {
            MockBehavior::Succeed { findings, delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                progress.report(1.0);
                Ok(findings)
            }
            MockBehavior::Fail { message, delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Err(PluginError::Generic { message })
            }
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
        }
    }
}

/// Metadata for a mock plugin with no key requirements and no rate limit
pub fn mock_metadata(name: &str, scan_types: &[ScanType]) -> PluginMetadata {
    PluginMetadata {
        name: name.to_string(),
        display_name: format!("Mock {name}"),
        description: format!("Scripted test plugin '{name}'"),
        version: "1.0.0".to_string(),
        author: "tests".to_string(),
        api_version: crate::core::version::get_api_version(),
        category: PluginCategory::Custom,
        supported_scan_types: scan_types.to_vec(),
        api_key_requirements: Vec::new(),
        rate_limit_per_minute: 0,
        timeout_secs: 30,
        dependencies: vec![],
    }
}

/// A required API key declaration for gating tests
pub fn required_key(key_name: &str) -> ApiKeyRequirement {
    ApiKeyRequirement {
        key_name: key_name.to_string(),
        env_var: format!("TEST_{}", key_name.to_uppercase()),
        display_name: key_name.to_uppercase(),
        description: format!("Test key '{key_name}'"),
        signup_url: String::new(),
        is_required: true,
    }
}

/// Register a mock plugin under `metadata`
pub fn register_mock(registry: &mut PluginRegistry, metadata: PluginMetadata, behavior: MockBehavior) {
    let template = metadata.clone();
    registry
        .register(
            metadata,
            Arc::new(move |_context| {
                Box::new(MockPlugin {
                    metadata: template.clone(),
                    behavior: behavior.clone(),
                })
            }),
        )
        .expect("mock plugin registration should succeed");
}

/// Empty registry over a default context
pub fn test_registry() -> PluginRegistry {
    let context = PluginContext::new(Arc::new(ApiKeyStore::empty()))
        .expect("test context construction should succeed");
    PluginRegistry::new(Arc::new(context))
}

/// Scheduler over `registry` with an empty key store
pub fn scheduler_over(registry: PluginRegistry) -> ScanScheduler {
    scheduler_with_keys(registry, ApiKeyStore::empty())
}

/// Scheduler over `registry` with an explicit key store
pub fn scheduler_with_keys(registry: PluginRegistry, keys: ApiKeyStore) -> ScanScheduler {
    ScanScheduler::new(Arc::new(registry), Arc::new(keys))
}

/// Email descriptor used as the default scan target in tests
pub fn email_target() -> TargetDescriptor {
    TargetDescriptor::new("user@example.com", ScanType::Email, "user@example.com")
}

/// Shorthand for a full-confidence finding
pub fn mock_finding(label: &str, source: &str, threat_level: ThreatLevel) -> Finding {
    Finding::new(label, "value", source, threat_level)
}
