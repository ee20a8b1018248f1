//! Phone Insight Plugin
//!
//! Local phone number analysis: country code resolution, North American
//! numbering plan classification, and canonical formatting. No network
//! access and no API keys, so this plugin is always configured.

use crate::builtin;
use crate::core::finding::{Finding, ThreatLevel};
use crate::core::target::{ScanType, TargetDescriptor};
use crate::plugin::context::PluginContext;
use crate::plugin::error::PluginResult;
use crate::plugin::traits::Plugin;
use crate::plugin::types::{DiscoveredPlugin, PluginCategory, PluginMetadata};
use crate::scanner::progress::ProgressHandle;
use std::sync::Arc;

// Register this builtin plugin for automatic discovery
builtin!(|| DiscoveredPlugin {
    metadata: PhoneInsightPlugin::static_metadata(),
    factory: Arc::new(|_ctx: &PluginContext| Box::new(PhoneInsightPlugin::new())),
});

const SOURCE: &str = "phone_insight";

/// Longest-prefix country calling code table, checked 3 digits down to 1
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("1", "United States / Canada"),
    ("7", "Russia / Kazakhstan"),
    ("20", "Egypt"),
    ("27", "South Africa"),
    ("31", "Netherlands"),
    ("33", "France"),
    ("34", "Spain"),
    ("39", "Italy"),
    ("44", "United Kingdom"),
    ("46", "Sweden"),
    ("47", "Norway"),
    ("48", "Poland"),
    ("49", "Germany"),
    ("52", "Mexico"),
    ("55", "Brazil"),
    ("61", "Australia"),
    ("63", "Philippines"),
    ("64", "New Zealand"),
    ("65", "Singapore"),
    ("81", "Japan"),
    ("82", "South Korea"),
    ("86", "China"),
    ("90", "Turkey"),
    ("91", "India"),
    ("234", "Nigeria"),
    ("254", "Kenya"),
    ("351", "Portugal"),
    ("353", "Ireland"),
    ("358", "Finland"),
    ("380", "Ukraine"),
    ("420", "Czech Republic"),
    ("971", "United Arab Emirates"),
    ("972", "Israel"),
];

/// NANP area codes that are never geographic subscriber lines
const NANP_TOLL_FREE: &[&str] = &["800", "833", "844", "855", "866", "877", "888"];
const NANP_PREMIUM: &str = "900";

pub struct PhoneInsightPlugin;

impl PhoneInsightPlugin {
    pub fn new() -> Self {
        Self
    }

    /// Get static plugin metadata without creating an instance
    pub fn static_metadata() -> PluginMetadata {
        PluginMetadata {
            name: "phone_insight".to_string(),
            display_name: "Phone Insight".to_string(),
            description: "Offline phone number classification and formatting".to_string(),
            version: "1.0.0".to_string(),
            author: "intelscan".to_string(),
            api_version: crate::core::version::get_api_version(),
            category: PluginCategory::PhoneIntelligence,
            supported_scan_types: vec![ScanType::Phone],
            api_key_requirements: vec![],
            rate_limit_per_minute: 1000,
            timeout_secs: 10,
            dependencies: vec![],
        }
    }
}

impl Default for PhoneInsightPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Plugin for PhoneInsightPlugin {
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

        let number = parse_number(&target.normalized_value);

        if number.digits.len() < 7 || number.digits.len() > 15 {
            findings.push(Finding::new(
                "Validation",
                "Invalid phone number format",
                SOURCE,
                ThreatLevel::High,
            ));
            progress.report(1.0);
            return Ok(findings);
        }

        findings.push(Finding::new(
            "Validation",
            "Valid phone number",
            SOURCE,
            ThreatLevel::Unknown,
        ));
        progress.report(0.3);

        if let Some((code, country)) = number.country() {
            findings.push(Finding::new(
                "Country",
                country,
                SOURCE,
                ThreatLevel::Unknown,
            ));
            findings.push(Finding::new(
                "Country Code",
                format!("+{code}"),
                SOURCE,
                ThreatLevel::Unknown,
            ));
        }
        progress.report(0.5);

        if let Some(national) = number.nanp_national() {
            let area_code = &national[..3];
            let (line_type, threat) = if area_code == NANP_PREMIUM {
                ("Premium Rate", ThreatLevel::High)
            } else if NANP_TOLL_FREE.contains(&area_code) {
                ("Toll-Free", ThreatLevel::Medium)
            } else {
                ("Geographic or Mobile", ThreatLevel::Unknown)
            };
            findings.push(Finding::new("Line Type", line_type, SOURCE, threat));
            findings.push(Finding::new(
                "National Format",
                format!(
                    "({}) {}-{}",
                    area_code,
                    &national[3..6],
                    &national[6..10]
                ),
                SOURCE,
                ThreatLevel::Unknown,
            ));
        }
        progress.report(0.8);

        if let Some(e164) = number.e164() {
            findings.push(Finding::new(
                "E.164 Format",
                e164,
                SOURCE,
                ThreatLevel::Unknown,
            ));
        }

        progress.report(1.0);
        Ok(findings)
    }
}

struct ParsedNumber {
    /// Digits only, punctuation removed
    digits: String,
    has_plus: bool,
}

fn parse_number(raw: &str) -> ParsedNumber {
    let trimmed = raw.trim();
    ParsedNumber {
        digits: trimmed.chars().filter(|c| c.is_ascii_digit()).collect(),
        has_plus: trimmed.starts_with('+'),
    }
}

impl ParsedNumber {
    /// Country calling code and name, longest prefix first
    ///
    /// Numbers without a leading `+` are only attributed when they carry an
    /// unambiguous NANP shape (11 digits starting with 1, or a bare 10-digit
    /// national number).
    fn country(&self) -> Option<(&'static str, &'static str)> {
        if self.has_plus {
            for prefix_len in (1..=3).rev() {
                if self.digits.len() < prefix_len {
                    continue;
                }
                let prefix = &self.digits[..prefix_len];
                if let Some((code, name)) =
                    COUNTRY_CODES.iter().find(|(code, _)| *code == prefix)
                {
                    return Some((code, name));
                }
            }
            None
        } else if self.digits.len() == 11 && self.digits.starts_with('1') {
            Some(("1", "United States / Canada"))
        } else if self.digits.len() == 10 {
            Some(("1", "United States / Canada"))
        } else {
            None
        }
    }

    /// Ten national digits when this is a NANP number
    fn nanp_national(&self) -> Option<&str> {
        match self.country() {
            Some(("1", _)) => {
                let national = if self.digits.len() == 11 {
                    &self.digits[1..]
                } else {
                    &self.digits[..]
                };
                (national.len() == 10).then_some(national)
            }
            _ => None,
        }
    }

    fn e164(&self) -> Option<String> {
        if self.has_plus {
            return Some(format!("+{}", self.digits));
        }
        match self.country() {
            Some(("1", _)) if self.digits.len() == 10 => Some(format!("+1{}", self.digits)),
            Some(_) => Some(format!("+{}", self.digits)),
            None => None,
        }
    }
}
