//! IP Classify Plugin
//!
//! Local address intelligence: scope classification (loopback, private,
//! link-local, multicast, documentation, global), version details, and the
//! reverse-DNS zone an investigator would query next. Offline by design.

use crate::builtin;
use crate::core::finding::{Finding, ThreatLevel};
use crate::core::target::{ScanType, TargetDescriptor};
use crate::plugin::context::PluginContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::Plugin;
use crate::plugin::types::{DiscoveredPlugin, PluginCategory, PluginMetadata};
use crate::scanner::progress::ProgressHandle;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

// Register this builtin plugin for automatic discovery
builtin!(|| DiscoveredPlugin {
    metadata: IpClassifyPlugin::static_metadata(),
    factory: Arc::new(|_ctx: &PluginContext| Box::new(IpClassifyPlugin::new())),
});

const SOURCE: &str = "ip_classify";

pub struct IpClassifyPlugin;

impl IpClassifyPlugin {
    pub fn new() -> Self {
        Self
    }

    /// Get static plugin metadata without creating an instance
    pub fn static_metadata() -> PluginMetadata {
        PluginMetadata {
            name: "ip_classify".to_string(),
            display_name: "IP Classify".to_string(),
            description: "Offline IP address scope classification".to_string(),
            version: "1.0.0".to_string(),
            author: "intelscan".to_string(),
            api_version: crate::core::version::get_api_version(),
            category: PluginCategory::IpIntelligence,
            supported_scan_types: vec![ScanType::Ip],
            api_key_requirements: vec![],
            rate_limit_per_minute: 0,
            timeout_secs: 5,
            dependencies: vec![],
        }
    }
}

impl Default for IpClassifyPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Plugin for IpClassifyPlugin {
    fn metadata(&self) -> PluginMetadata {
        Self::static_metadata()
    }

    async fn scan(
        &self,
        target: &TargetDescriptor,
        progress: ProgressHandle,
    ) -> PluginResult<Vec<Finding>> {
        progress.report(0.1);

        // The parser normalizes IP targets, so a parse failure here means the
        // descriptor was built by hand with a bad value.
        let addr: IpAddr = target.normalized_value.parse().map_err(|_| {
            PluginError::ExecutionError {
                plugin_name: SOURCE.to_string(),
                operation: "scan".to_string(),
                cause: format!("not an IP address: {}", target.normalized_value),
            }
        })?;

        let mut findings = vec![Finding::new(
            "Address Version",
            match addr {
                IpAddr::V4(_) => "IPv4",
                IpAddr::V6(_) => "IPv6",
            },
            SOURCE,
            ThreatLevel::Unknown,
        )];
        progress.report(0.4);

        let (scope, threat) = match addr {
            IpAddr::V4(v4) => classify_v4(v4),
            IpAddr::V6(v6) => classify_v6(v6),
        };
        findings.push(Finding::new("Scope", scope, SOURCE, threat));
        progress.report(0.7);

        findings.push(Finding::new(
            "Reverse DNS Zone",
            reverse_zone(addr),
            SOURCE,
            ThreatLevel::Unknown,
        ));

        progress.report(1.0);
        Ok(findings)
    }
}

fn classify_v4(addr: Ipv4Addr) -> (&'static str, ThreatLevel) {
    if addr.is_loopback() {
        ("Loopback", ThreatLevel::Low)
    } else if addr.is_private() {
        ("Private (RFC 1918)", ThreatLevel::Low)
    } else if addr.is_link_local() {
        ("Link-Local", ThreatLevel::Low)
    } else if addr.is_multicast() {
        ("Multicast", ThreatLevel::Low)
    } else if addr.is_documentation() {
        ("Documentation Range", ThreatLevel::Low)
    } else if addr.is_broadcast() || addr.is_unspecified() {
        ("Reserved", ThreatLevel::Low)
    } else {
        ("Publicly Routable", ThreatLevel::Unknown)
    }
}

fn classify_v6(addr: Ipv6Addr) -> (&'static str, ThreatLevel) {
    let segments = addr.segments();
    if addr.is_loopback() {
        ("Loopback", ThreatLevel::Low)
    } else if (segments[0] & 0xfe00) == 0xfc00 {
        // fc00::/7
        ("Unique Local (RFC 4193)", ThreatLevel::Low)
    } else if (segments[0] & 0xffc0) == 0xfe80 {
        // fe80::/10
        ("Link-Local", ThreatLevel::Low)
    } else if addr.is_multicast() {
        ("Multicast", ThreatLevel::Low)
    } else if segments[0] == 0x2001 && segments[1] == 0x0db8 {
        // 2001:db8::/32
        ("Documentation Range", ThreatLevel::Low)
    } else if addr.is_unspecified() {
        ("Reserved", ThreatLevel::Low)
    } else {
        ("Publicly Routable", ThreatLevel::Unknown)
    }
}

/// The in-addr.arpa / ip6.arpa zone for a PTR lookup of this address
fn reverse_zone(addr: IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            format!(
                "{}.{}.{}.{}.in-addr.arpa",
                octets[3], octets[2], octets[1], octets[0]
            )
        }
        IpAddr::V6(v6) => {
            let mut nibbles = Vec::with_capacity(32);
            for byte in v6.octets().iter().rev() {
                nibbles.push(format!("{:x}", byte & 0x0f));
                nibbles.push(format!("{:x}", byte >> 4));
            }
            format!("{}.ip6.arpa", nibbles.join("."))
        }
    }
}
