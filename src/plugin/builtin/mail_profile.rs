//! Mail Profile Plugin
//!
//! Email profile lookup via Gravatar. Uses the SHA-256 address hash form of
//! the API, checks avatar existence first, then pulls the public profile
//! document for identity details. No API key required.

use crate::builtin;
use crate::core::finding::{Finding, ThreatLevel};
use crate::core::target::{ScanType, TargetDescriptor};
use crate::plugin::context::PluginContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::Plugin;
use crate::plugin::types::{DiscoveredPlugin, PluginCategory, PluginMetadata};
use crate::scanner::progress::ProgressHandle;
use sha2::{Digest, Sha256};
use std::sync::Arc;

// Register this builtin plugin for automatic discovery
builtin!(|| DiscoveredPlugin {
    metadata: MailProfilePlugin::static_metadata(),
    factory: Arc::new(|ctx: &PluginContext| Box::new(MailProfilePlugin::new(ctx))),
});

const SOURCE: &str = "mail_profile";
const BASE_URL: &str = "https://gravatar.com";

pub struct MailProfilePlugin {
    http: reqwest::Client,
}

impl MailProfilePlugin {
    pub fn new(ctx: &PluginContext) -> Self {
        Self {
            http: ctx.http.clone(),
        }
    }

    /// Get static plugin metadata without creating an instance
    pub fn static_metadata() -> PluginMetadata {
        PluginMetadata {
            name: "mail_profile".to_string(),
            display_name: "Mail Profile".to_string(),
            description: "Email profile lookup via Gravatar".to_string(),
            version: "1.0.0".to_string(),
            author: "intelscan".to_string(),
            api_version: crate::core::version::get_api_version(),
            category: PluginCategory::IdentityLookup,
            supported_scan_types: vec![ScanType::Email],
            api_key_requirements: vec![],
            rate_limit_per_minute: 60,
            timeout_secs: 15,
            dependencies: vec![],
        }
    }
}

#[async_trait::async_trait]
impl Plugin for MailProfilePlugin {
    fn metadata(&self) -> PluginMetadata {
        Self::static_metadata()
    }

    async fn scan(
        &self,
        target: &TargetDescriptor,
        progress: ProgressHandle,
    ) -> PluginResult<Vec<Finding>> {
        let mut findings = Vec::new();
        progress.report(0.1);

        let hash = email_hash(&target.normalized_value);

        // Avatar existence check; d=404 suppresses the generated fallback
        let avatar_url = format!("{BASE_URL}/avatar/{hash}?d=404");
        let response = self
            .http
            .get(&avatar_url)
            .send()
            .await
            .map_err(|e| PluginError::from_http(SOURCE, e))?;
        progress.report(0.4);

        if response.status().is_success() {
            findings.push(Finding::new(
                "Gravatar Avatar",
                format!("{BASE_URL}/avatar/{hash}"),
                SOURCE,
                ThreatLevel::Unknown,
            ));
        }

        // Public profile document
        let profile_url = format!("{BASE_URL}/{hash}.json");
        let response = self
            .http
            .get(&profile_url)
            .send()
            .await
            .map_err(|e| PluginError::from_http(SOURCE, e))?;
        progress.report(0.7);

        match response.status().as_u16() {
            200 => {
                let body: serde_json::Value = response
                    .json()
                    .await
                    .map_err(|e| PluginError::from_http(SOURCE, e))?;
                findings.extend(profile_findings(&body));
            }
            404 => {
                findings.push(Finding::new(
                    "Gravatar Profile",
                    "No profile found",
                    SOURCE,
                    ThreatLevel::Unknown,
                ));
            }
            status => {
                return Err(PluginError::ServiceError {
                    plugin_name: SOURCE.to_string(),
                    cause: format!("unexpected profile status {status}"),
                });
            }
        }

        progress.report(1.0);
        Ok(findings)
    }
}

/// SHA-256 of the canonicalized address, as Gravatar expects
fn email_hash(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Extract findings from a Gravatar profile document
fn profile_findings(body: &serde_json::Value) -> Vec<Finding> {
    let mut findings = Vec::new();
    let entry = body
        .get("entry")
        .and_then(|entries| entries.get(0))
        .cloned()
        .unwrap_or_default();

    let text_field = |key: &str| {
        entry
            .get(key)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(name) = text_field("displayName") {
        findings.push(Finding::new("Gravatar Name", name, SOURCE, ThreatLevel::Unknown));
    }
    if let Some(about) = text_field("aboutMe") {
        let about = if about.chars().count() > 100 {
            let truncated: String = about.chars().take(100).collect();
            format!("{truncated}...")
        } else {
            about
        };
        findings.push(Finding::new("About", about, SOURCE, ThreatLevel::Unknown));
    }
    if let Some(location) = text_field("currentLocation") {
        findings.push(Finding::new("Location", location, SOURCE, ThreatLevel::Unknown));
    }
    if let Some(url) = text_field("profileUrl") {
        findings.push(Finding::new("Profile URL", url, SOURCE, ThreatLevel::Unknown));
    }

    if let Some(accounts) = entry.get("accounts").and_then(serde_json::Value::as_array) {
        let names: Vec<&str> = accounts
            .iter()
            .take(5)
            .filter_map(|account| {
                account
                    .get("shortname")
                    .or_else(|| account.get("domain"))
                    .and_then(serde_json::Value::as_str)
            })
            .collect();
        if !names.is_empty() {
            findings.push(Finding::new(
                "Linked Accounts",
                names.join(", "),
                SOURCE,
                ThreatLevel::Unknown,
            ));
        }
    }

    findings
}
