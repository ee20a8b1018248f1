//! Typed scan targets
//!
//! The target descriptor is the immutable value handed from the query parser
//! to the registry and scheduler. It carries the detected scan type, the
//! normalized identifier value, and any structured filter fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// Identifier categories a scan can investigate
///
/// The set is closed: the parser never produces a descriptor outside these
/// variants, and plugins declare support in terms of them. The string forms
/// double as the field names of the structured query grammar.
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
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Email,
    Phone,
    Ip,
    Username,
    Address,
    Hash,
}

impl ScanType {
    /// All scan types in heuristic precedence order for bare-target
    /// detection: email > IP > phone > hash > username > address.
    ///
    /// This ordering is a deliberate tie-break for ambiguous input (a 32-char
    /// hex string is both a plausible hash and a plausible username; the hash
    /// interpretation wins). Changing it changes user-visible behavior.
    pub const DETECTION_PRECEDENCE: [ScanType; 6] = [
        ScanType::Email,
        ScanType::Ip,
        ScanType::Phone,
        ScanType::Hash,
        ScanType::Username,
        ScanType::Address,
    ];
}

/// Immutable scan target produced by the query parser
///
/// Equality is semantic: two descriptors are equal when they name the same
/// scan type, normalized value, and structured fields. The raw input string
/// is provenance only and does not participate in comparison, so re-parsing
/// a descriptor's canonical query string yields an equal descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// The input string exactly as the caller supplied it
    pub raw_input: String,
    /// Detected or explicitly selected scan type
    pub scan_type: ScanType,
    /// Normalized identifier value, always non-empty
    pub normalized_value: String,
    /// Additional recognized `field:"value"` pairs from a structured query
    pub structured_fields: BTreeMap<String, String>,
}

impl PartialEq for TargetDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.scan_type == other.scan_type
            && self.normalized_value == other.normalized_value
            && self.structured_fields == other.structured_fields
    }
}

impl Eq for TargetDescriptor {}

impl TargetDescriptor {
    /// Create a descriptor with no structured fields
    ///
    /// The query parser is the normal producer; this constructor exists for
    /// callers that already hold a typed value (tests, embedding APIs).
    pub fn new(
        raw_input: impl Into<String>,
        scan_type: ScanType,
        normalized_value: impl Into<String>,
    ) -> Self {
        Self {
            raw_input: raw_input.into(),
            scan_type,
            normalized_value: normalized_value.into(),
            structured_fields: BTreeMap::new(),
        }
    }

    /// Look up a structured filter field by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.structured_fields.get(name).map(String::as_str)
    }

    /// Render the canonical structured query string for this descriptor
    ///
    /// The primary scan-type field comes first, followed by the structured
    /// fields in sorted order. Re-parsing this string yields an equal
    /// descriptor.
    pub fn to_query_string(&self) -> String {
        let mut out = format!("{}:\"{}\"", self.scan_type, self.normalized_value);
        for (field, value) in &self.structured_fields {
            out.push_str(&format!(" {field}:\"{value}\""));
        }
        out
    }
}

impl std::fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.normalized_value, self.scan_type)
    }
}
