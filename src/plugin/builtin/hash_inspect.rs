//! Hash Inspect Plugin
//!
//! Local digest classification: identifies the likely algorithm from the
//! hex length, flags digests of well-known trivial inputs, and calls out
//! algorithms that should no longer protect anything.

use crate::builtin;
use crate::core::finding::{Finding, ThreatLevel};
use crate::core::target::{ScanType, TargetDescriptor};
use crate::plugin::context::PluginContext;
use crate::plugin::error::PluginResult;
use crate::plugin::traits::Plugin;
use crate::plugin::types::{DiscoveredPlugin, PluginCategory, PluginMetadata};
use crate::scanner::progress::ProgressHandle;
use sha2::{Digest, Sha256, Sha512};
use std::sync::Arc;

// Register this builtin plugin for automatic discovery
builtin!(|| DiscoveredPlugin {
    metadata: HashInspectPlugin::static_metadata(),
    factory: Arc::new(|_ctx: &PluginContext| Box::new(HashInspectPlugin::new())),
});

const SOURCE: &str = "hash_inspect";

/// Digests of the empty input for algorithms this binary cannot compute
const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";
const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

pub struct HashInspectPlugin;

impl HashInspectPlugin {
    pub fn new() -> Self {
        Self
    }

    /// Get static plugin metadata without creating an instance
    pub fn static_metadata() -> PluginMetadata {
        PluginMetadata {
            name: "hash_inspect".to_string(),
            display_name: "Hash Inspect".to_string(),
            description: "Offline digest algorithm identification".to_string(),
            version: "1.0.0".to_string(),
            author: "intelscan".to_string(),
            api_version: crate::core::version::get_api_version(),
            category: PluginCategory::HashLookup,
            supported_scan_types: vec![ScanType::Hash],
            api_key_requirements: vec![],
            rate_limit_per_minute: 0,
            timeout_secs: 5,
            dependencies: vec![],
        }
    }
}

impl Default for HashInspectPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Plugin for HashInspectPlugin {
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

        let digest = target.normalized_value.trim().to_ascii_lowercase();

        let Some((algorithm, weak)) = identify_algorithm(&digest) else {
            findings.push(Finding::new(
                "Algorithm",
                format!("Unrecognized digest length ({} hex chars)", digest.len()),
                SOURCE,
                ThreatLevel::Low,
            ));
            progress.report(1.0);
            return Ok(findings);
        };

        findings.push(Finding::new(
            "Algorithm",
            algorithm,
            SOURCE,
            ThreatLevel::Unknown,
        ));
        progress.report(0.4);

        if weak {
            findings.push(Finding::new(
                "Weak Algorithm",
                format!("{algorithm} is broken for collision resistance"),
                SOURCE,
                ThreatLevel::Medium,
            ));
        }
        progress.report(0.6);

        if let Some(input) = trivial_input(&digest) {
            findings.push(Finding::new(
                "Trivial Input",
                format!("Digest of {input}"),
                SOURCE,
                ThreatLevel::Medium,
            ));
        }

        if digest.chars().all(|c| c == '0') {
            findings.push(Finding::new(
                "Placeholder Digest",
                "All-zero value, likely a sentinel rather than a real hash",
                SOURCE,
                ThreatLevel::Low,
            ));
        }

        progress.report(1.0);
        Ok(findings)
    }
}

/// Algorithm name and whether it is collision-broken, from the hex length
fn identify_algorithm(digest: &str) -> Option<(&'static str, bool)> {
    match digest.len() {
        32 => Some(("MD5", true)),
        40 => Some(("SHA-1", true)),
        56 => Some(("SHA-224", false)),
        64 => Some(("SHA-256", false)),
        96 => Some(("SHA-384", false)),
        128 => Some(("SHA-512", false)),
        _ => None,
    }
}

/// Check the digest against hashes of well-known trivial inputs
fn trivial_input(digest: &str) -> Option<&'static str> {
    if digest == EMPTY_MD5 || digest == EMPTY_SHA1 {
        return Some("the empty string");
    }
    match digest.len() {
        64 => {
            if digest == hex_digest::<Sha256>(b"") {
                Some("the empty string")
            } else if digest == hex_digest::<Sha256>(b"password") {
                Some("the literal string \"password\"")
            } else {
                None
            }
        }
        128 => (digest == hex_digest::<Sha512>(b"")).then_some("the empty string"),
        _ => None,
    }
}

fn hex_digest<D: Digest>(input: &[u8]) -> String {
    let mut hasher = D::new();
    hasher.update(input);
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
