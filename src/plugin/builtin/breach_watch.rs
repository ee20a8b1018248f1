//! Breach Watch Plugin
//!
//! Data breach exposure via the Have I Been Pwned v3 API. Requires an API
//! key; without one the scheduler reports the plugin as unconfigured instead
//! of running it, and a direct invocation fails with a missing-key error.

use crate::builtin;
use crate::core::finding::{Finding, ThreatLevel};
use crate::core::target::{ScanType, TargetDescriptor};
use crate::plugin::context::PluginContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::keys::ApiKeyStore;
use crate::plugin::traits::Plugin;
use crate::plugin::types::{ApiKeyRequirement, DiscoveredPlugin, PluginCategory, PluginMetadata};
use crate::scanner::progress::ProgressHandle;
use std::sync::Arc;

// Register this builtin plugin for automatic discovery
builtin!(|| DiscoveredPlugin {
    metadata: BreachWatchPlugin::static_metadata(),
    factory: Arc::new(|ctx: &PluginContext| Box::new(BreachWatchPlugin::new(ctx))),
});

const SOURCE: &str = "breach_watch";
const KEY_NAME: &str = "breach_watch_api";
const BASE_URL: &str = "https://haveibeenpwned.com/api/v3";

pub struct BreachWatchPlugin {
    http: reqwest::Client,
    keys: Arc<ApiKeyStore>,
}

impl BreachWatchPlugin {
    pub fn new(ctx: &PluginContext) -> Self {
        Self {
            http: ctx.http.clone(),
            keys: ctx.keys.clone(),
        }
    }

    /// Get static plugin metadata without creating an instance
    pub fn static_metadata() -> PluginMetadata {
        PluginMetadata {
            name: "breach_watch".to_string(),
            display_name: "Breach Watch".to_string(),
            description: "Data breach and paste exposure via the HIBP API".to_string(),
            version: "1.0.0".to_string(),
            author: "intelscan".to_string(),
            api_version: crate::core::version::get_api_version(),
            category: PluginCategory::BreachDetection,
            supported_scan_types: vec![ScanType::Email],
            api_key_requirements: vec![ApiKeyRequirement {
                key_name: KEY_NAME.to_string(),
                env_var: "INTELSCAN_BREACH_API_KEY".to_string(),
                display_name: "HIBP API Key".to_string(),
                description: "Required for breach checking via HIBP API v3".to_string(),
                signup_url: "https://haveibeenpwned.com/API/Key".to_string(),
                is_required: true,
            }],
            rate_limit_per_minute: 120,
            timeout_secs: 30,
            dependencies: vec![],
        }
    }

    async fn get(&self, url: &str, api_key: &str) -> PluginResult<reqwest::Response> {
        self.http
            .get(url)
            .header("hibp-api-key", api_key)
            .send()
            .await
            .map_err(|e| PluginError::from_http(SOURCE, e))
    }
}

#[async_trait::async_trait]
impl Plugin for BreachWatchPlugin {
    fn metadata(&self) -> PluginMetadata {
        Self::static_metadata()
    }

    async fn scan(
        &self,
        target: &TargetDescriptor,
        progress: ProgressHandle,
    ) -> PluginResult<Vec<Finding>> {
        let Some(api_key) = self.keys.get(KEY_NAME) else {
            return Err(PluginError::MissingApiKey {
                plugin_name: SOURCE.to_string(),
                key_name: KEY_NAME.to_string(),
            });
        };

        let mut findings = Vec::new();
        progress.report(0.2);

        let account = &target.normalized_value;
        let url = format!("{BASE_URL}/breachedaccount/{account}?truncateResponse=false");
        let response = self.get(&url, api_key).await?;

        match response.status().as_u16() {
            200 => {
                let body: serde_json::Value = response
                    .json()
                    .await
                    .map_err(|e| PluginError::from_http(SOURCE, e))?;
                findings.extend(breach_findings(&body));
            }
            404 => {
                findings.push(Finding::new(
                    "Data Breaches",
                    "No breaches found",
                    SOURCE,
                    ThreatLevel::Unknown,
                ));
            }
            401 => {
                return Err(PluginError::ServiceError {
                    plugin_name: SOURCE.to_string(),
                    cause: "API key rejected".to_string(),
                });
            }
            429 => {
                findings.push(Finding::new(
                    "Breach Watch",
                    "Rate limited - try again later",
                    SOURCE,
                    ThreatLevel::Low,
                ));
                progress.report(1.0);
                return Ok(findings);
            }
            status => {
                return Err(PluginError::ServiceError {
                    plugin_name: SOURCE.to_string(),
                    cause: format!("unexpected breach status {status}"),
                });
            }
        }
        progress.report(0.6);

        let url = format!("{BASE_URL}/pasteaccount/{account}");
        let response = self.get(&url, api_key).await?;
        match response.status().as_u16() {
            200 => {
                let body: serde_json::Value = response
                    .json()
                    .await
                    .map_err(|e| PluginError::from_http(SOURCE, e))?;
                findings.extend(paste_findings(&body));
            }
            404 => {
                findings.push(Finding::new(
                    "Pastes",
                    "No pastes found",
                    SOURCE,
                    ThreatLevel::Unknown,
                ));
            }
            // Paste lookups are best-effort once breaches succeeded
            _ => {}
        }

        progress.report(1.0);
        Ok(findings)
    }
}

/// Findings from a breachedaccount response body
fn breach_findings(body: &serde_json::Value) -> Vec<Finding> {
    let mut findings = Vec::new();
    let Some(breaches) = body.as_array() else {
        return findings;
    };
    if breaches.is_empty() {
        return findings;
    }

    let names: Vec<&str> = breaches
        .iter()
        .take(5)
        .map(|b| b.get("Name").and_then(serde_json::Value::as_str).unwrap_or("Unknown"))
        .collect();
    let suffix = if breaches.len() > 5 { "..." } else { "" };
    findings.push(Finding::new(
        "Data Breaches",
        format!(
            "FOUND IN {} BREACHES: {}{}",
            breaches.len(),
            names.join(", "),
            suffix
        ),
        SOURCE,
        ThreatLevel::High,
    ));

    for breach in breaches.iter().take(3) {
        let name = breach
            .get("Name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("Unknown");
        let date = breach
            .get("BreachDate")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("Unknown");
        let exposed: Vec<&str> = breach
            .get("DataClasses")
            .and_then(serde_json::Value::as_array)
            .map(|classes| {
                classes
                    .iter()
                    .take(3)
                    .filter_map(serde_json::Value::as_str)
                    .collect()
            })
            .unwrap_or_default();
        findings.push(Finding::new(
            format!("Breach: {name}"),
            format!("Date: {date} | Exposed: {}", exposed.join(", ")),
            SOURCE,
            ThreatLevel::Medium,
        ));
    }

    findings
}

/// Findings from a pasteaccount response body
fn paste_findings(body: &serde_json::Value) -> Vec<Finding> {
    match body.as_array() {
        Some(pastes) if !pastes.is_empty() => vec![Finding::new(
            "Pastes",
            format!("Found in {} paste(s)", pastes.len()),
            SOURCE,
            ThreatLevel::Medium,
        )],
        _ => vec![],
    }
}
