//! Scan Report Assembly
//!
//! Converts a terminal scan session into the caller-facing report: findings
//! ranked by threat level, per-level counts, scan duration, and the
//! per-plugin error log. The report is the unit of output serialization.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::finding::{Finding, ThreatLevel};
use crate::core::target::TargetDescriptor;
use crate::scanner::error::TaskError;
use crate::scanner::types::{ScanSession, ScanStatus};

/// Per-threat-level finding counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ThreatCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unknown: usize,
}

impl ThreatCounts {
    /// Tally findings into per-level counts
    pub fn tally(findings: &[Finding]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            match finding.threat_level {
                ThreatLevel::Critical => counts.critical += 1,
                ThreatLevel::High => counts.high += 1,
                ThreatLevel::Medium => counts.medium += 1,
                ThreatLevel::Low => counts.low += 1,
                ThreatLevel::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.unknown
    }
}

/// Final result of one scan, ranked and ready for display
///
/// Findings are stable-sorted by threat level descending, so ties keep the
/// session's dispatch-then-emission order. No deduplication happens here:
/// two plugins reporting the same fact are both kept because provenance is
/// itself information.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub session_id: String,
    pub target: TargetDescriptor,
    pub status: ScanStatus,
    pub findings: Vec<Finding>,
    pub counts: ThreatCounts,
    pub dispatched_plugins: Vec<String>,
    pub errors: BTreeMap<String, TaskError>,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
}

impl ScanReport {
    /// Build the report from a terminal session
    pub fn from_session(session: ScanSession) -> Self {
        let duration_secs = session
            .duration()
            .map(|d| d.num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        let mut findings = session.findings;
        // Stable sort: equal threat levels keep dispatch order.
        findings.sort_by(|a, b| b.threat_level.cmp(&a.threat_level));
        let counts = ThreatCounts::tally(&findings);

        Self {
            session_id: session.session_id,
            target: session.target,
            status: session.status,
            findings,
            counts,
            dispatched_plugins: session.dispatched_plugins,
            errors: session.errors,
            started_at: session.started_at,
            duration_secs,
        }
    }

    /// Findings at or above `min`, preserving rank order
    pub fn findings_at_or_above(&self, min: ThreatLevel) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.threat_level >= min)
            .collect()
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}
