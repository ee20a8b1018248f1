//! Scripted plugin fixtures built through the public crate API
//!
//! Everything here goes through `intelscan::plugin::api` and
//! `intelscan::scanner::api` exactly the way an embedding application would.
//! Unit-level mocks with paused-clock scripting live inside the crate; these
//! fixtures favor the real construction path: context, registry, discovery,
//! scheduler.

use std::sync::Arc;

use intelscan::core::finding::{Finding, ThreatLevel};
use intelscan::core::target::{ScanType, TargetDescriptor};
use intelscan::plugin::api::{
    ApiKeyRequirement, ApiKeyStore, Plugin, PluginCategory, PluginContext, PluginDiscovery,
    PluginError, PluginMetadata, PluginRegistry, PluginResult,
};
use intelscan::scanner::api::{ProgressHandle, ScanScheduler};

/// What a scripted plugin does when its scan runs
#[derive(Clone)]
pub enum ScanScript {
    /// Return these findings
    Findings(Vec<Finding>),
    /// Fail with this message
    Fail(String),
}

/// Plugin following a fixed script
pub struct ScriptedPlugin {
    metadata: PluginMetadata,
    script: ScanScript,
}

#[async_trait::async_trait]
impl Plugin for ScriptedPlugin {
    fn metadata(&self) -> PluginMetadata {
        self.metadata.clone()
    }

    async fn scan(
        &self,
        _target: &TargetDescriptor,
        progress: ProgressHandle,
    ) -> PluginResult<Vec<Finding>> {
        progress.report(0.5);
        match self.script.clone() {
            ScanScript::Findings(findings) => {
                progress.report(1.0);
                Ok(findings)
            }
            ScanScript::Fail(message) => Err(PluginError::Generic { message }),
        }
    }
}

/// Keyless metadata answering exactly one scan type
pub fn scripted_metadata(name: &str, scan_type: ScanType) -> PluginMetadata {
    PluginMetadata {
        name: name.to_string(),
        display_name: format!("Scripted {name}"),
        description: format!("Integration test plugin '{name}'"),
        version: "1.0.0".to_string(),
        author: "intelscan tests".to_string(),
        api_version: intelscan::core::version::get_api_version(),
        category: PluginCategory::Custom,
        supported_scan_types: vec![scan_type],
        api_key_requirements: Vec::new(),
        rate_limit_per_minute: 0,
        timeout_secs: 10,
        dependencies: vec![],
    }
}

/// A required key declaration pointing at a test-only environment variable
pub fn required_key(key_name: &str) -> ApiKeyRequirement {
    ApiKeyRequirement {
        key_name: key_name.to_string(),
        env_var: format!("INTELSCAN_IT_{}", key_name.to_uppercase()),
        display_name: key_name.to_uppercase(),
        description: format!("Integration test key '{key_name}'"),
        signup_url: "https://example.com/signup".to_string(),
        is_required: true,
    }
}

/// Empty registry over an empty key store
pub fn empty_registry() -> PluginRegistry {
    registry_with_keys(Arc::new(ApiKeyStore::empty()))
}

pub fn registry_with_keys(keys: Arc<ApiKeyStore>) -> PluginRegistry {
    let context =
        PluginContext::new(keys).expect("test plugin context construction should succeed");
    PluginRegistry::new(Arc::new(context))
}

/// Register a scripted plugin under `metadata`
pub fn register_scripted(
    registry: &mut PluginRegistry,
    metadata: PluginMetadata,
    script: ScanScript,
) {
    let template = metadata.clone();
    registry
        .register(
            metadata,
            Arc::new(move |_context: &PluginContext| {
                Box::new(ScriptedPlugin {
                    metadata: template.clone(),
                    script: script.clone(),
                })
            }),
        )
        .expect("scripted plugin registration should succeed");
}

/// Scheduler over `registry` with an empty key store
pub fn scheduler_over(registry: PluginRegistry) -> ScanScheduler {
    scheduler_with_keys(registry, ApiKeyStore::empty())
}

pub fn scheduler_with_keys(registry: PluginRegistry, keys: ApiKeyStore) -> ScanScheduler {
    ScanScheduler::new(Arc::new(registry), Arc::new(keys))
}

/// Scheduler over the real builtin plugins, wired the way startup wires it
///
/// Uses an explicit empty key store rather than the process environment so a
/// developer's configured keys cannot leak into test outcomes, and takes
/// exclusions for keeping network-reaching builtins out of offline tests.
pub fn builtin_scheduler(excludes: &[&str]) -> ScanScheduler {
    let keys = Arc::new(ApiKeyStore::empty());
    let context =
        PluginContext::new(keys.clone()).expect("test plugin context construction should succeed");
    let mut registry = PluginRegistry::new(Arc::new(context));
    let discovery =
        PluginDiscovery::with_excludes(excludes.iter().map(|name| name.to_string()).collect());
    discovery
        .register_all(&mut registry)
        .expect("builtin registration should succeed");
    ScanScheduler::new(Arc::new(registry), keys)
}

/// Shorthand for a full-confidence finding
pub fn sample_finding(label: &str, source: &str, threat_level: ThreatLevel) -> Finding {
    Finding::new(label, "value", source, threat_level)
}
