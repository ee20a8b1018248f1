//! Normalized findings
//!
//! A finding is one unit of intelligence a plugin reports about a target.
//! Findings are immutable once produced; ownership moves from the plugin to
//! the aggregator on emission.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Coarse severity tag used to rank findings
///
/// Ordering is ascending by severity so `Ord` comparisons and sorts work
/// directly: `Unknown < Low < Medium < High < Critical`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

/// One normalized unit of intelligence returned by a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Short label naming what this finding describes
    pub label: String,
    /// The reported value
    pub value: String,
    /// Display name of the plugin that produced the finding
    pub source: String,
    /// Severity used for ranking
    pub threat_level: ThreatLevel,
    /// Reporter confidence in [0, 1], 1.0 when unstated
    pub confidence: f64,
}

impl Finding {
    /// Create a finding with full confidence
    pub fn new(
        label: impl Into<String>,
        value: impl Into<String>,
        source: impl Into<String>,
        threat_level: ThreatLevel,
    ) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            source: source.into(),
            threat_level,
            confidence: 1.0,
        }
    }

    /// Attach a confidence value, clamped to [0, 1]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_threat_level_ordering() {
        assert!(ThreatLevel::Critical > ThreatLevel::High);
        assert!(ThreatLevel::High > ThreatLevel::Medium);
        assert!(ThreatLevel::Medium > ThreatLevel::Low);
        assert!(ThreatLevel::Low > ThreatLevel::Unknown);
    }

    #[test]
    fn test_threat_level_display_and_parse() {
        assert_eq!(ThreatLevel::High.to_string(), "HIGH");
        assert_eq!(ThreatLevel::from_str("critical").unwrap(), ThreatLevel::Critical);
        assert_eq!(ThreatLevel::from_str("LOW").unwrap(), ThreatLevel::Low);
        assert!(ThreatLevel::from_str("severe").is_err());
    }

    #[test]
    fn test_finding_defaults_to_full_confidence() {
        let finding = Finding::new("Breach", "example leak", "Test Source", ThreatLevel::High);
        assert_eq!(finding.confidence, 1.0);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let finding = Finding::new("A", "b", "c", ThreatLevel::Low).with_confidence(1.7);
        assert_eq!(finding.confidence, 1.0);
        let finding = finding.with_confidence(-0.3);
        assert_eq!(finding.confidence, 0.0);
    }
}
