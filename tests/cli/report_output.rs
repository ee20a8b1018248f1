//! Report rendering and JSON output tests
//!
//! Runs real offline builtin scans end to end and checks the shapes the CLI
//! promises: the JSON document consumed by scripting users, threat filtering
//! semantics, and that the text renderers hold up against real report data.

use std::sync::Arc;

use intelscan::app::cli::display;
use intelscan::core::finding::ThreatLevel;
use intelscan::core::query;
use intelscan::plugin::api::{ApiKeyStore, PluginContext, PluginDiscovery, PluginRegistry};
use intelscan::scanner::api::{ScanOptions, ScanReport, ScanScheduler, ScanStatus};
use serde_json::Value;

/// Wire keys, registry, and scheduler the way startup does, builtins only
fn builtin_stack() -> (Arc<PluginRegistry>, Arc<ApiKeyStore>) {
    let keys = Arc::new(ApiKeyStore::empty());
    let context =
        PluginContext::new(keys.clone()).expect("plugin context construction should succeed");
    let mut registry = PluginRegistry::new(Arc::new(context));
    PluginDiscovery::new()
        .register_all(&mut registry)
        .expect("builtin registration should succeed");
    (Arc::new(registry), keys)
}

/// Scan `raw_query` against the builtin registry and assemble the report
///
/// Only offline-capable targets (IP, hash, phone) belong here; email targets
/// would resolve network-reaching builtins.
async fn scan_report(raw_query: &str) -> ScanReport {
    let (registry, keys) = builtin_stack();
    let scheduler = ScanScheduler::new(registry, keys);
    let target = query::parse(raw_query).expect("query should parse");
    let session = scheduler
        .run_scan(target, ScanOptions::default())
        .await
        .expect("scan should reach a terminal session");
    ScanReport::from_session(session)
}

#[tokio::test]
async fn test_json_report_shape_for_ip_scan() {
    let report = scan_report("8.8.8.8").await;
    let rendered = display::render_json(&report, None).unwrap();
    let json: Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(json["status"], "completed");
    assert_eq!(json["target"]["scan_type"], "ip");
    assert_eq!(json["target"]["normalized_value"], "8.8.8.8");
    assert!(json["session_id"].as_str().unwrap().starts_with("scan-"));
    assert_eq!(json["dispatched_plugins"], serde_json::json!(["ip_classify"]));
    assert_eq!(json["errors"], serde_json::json!({}));
    assert!(json["duration_secs"].as_f64().unwrap() >= 0.0);
    // RFC 3339 timestamp from the session start
    assert!(json["started_at"].as_str().unwrap().contains('T'));

    let findings = json["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 3);
    assert!(findings
        .iter()
        .any(|finding| finding["label"] == "Scope"
            && finding["value"] == "Publicly Routable"));
    assert!(findings
        .iter()
        .all(|finding| finding["threat_level"] == "unknown"));
    assert_eq!(json["counts"]["unknown"], 3);
}

#[tokio::test]
async fn test_json_min_threat_filters_findings_but_not_counts() {
    // MD5 of "password": Algorithm (UNKNOWN) plus Weak Algorithm (MEDIUM).
    let report = scan_report("5f4dcc3b5aa765d61d8327deb882cf99").await;
    assert_eq!(report.status, ScanStatus::Completed);

    let rendered = display::render_json(&report, Some(ThreatLevel::Medium)).unwrap();
    let json: Value = serde_json::from_str(&rendered).unwrap();

    let findings = json["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["label"], "Weak Algorithm");
    assert_eq!(findings[0]["threat_level"], "medium");

    // Counts keep the full tally so the filter is visible as a filter.
    assert_eq!(json["counts"]["medium"], 1);
    assert_eq!(json["counts"]["unknown"], 1);
}

#[tokio::test]
async fn test_text_renderer_handles_real_reports() {
    let report = scan_report("127.0.0.1").await;

    // Plain, colored, filtered, and filtered-to-empty renderings must all
    // hold up; output goes to the captured test stdout.
    display::render_report(&report, None, false);
    display::render_report(&report, None, true);
    display::render_report(&report, Some(ThreatLevel::Low), false);
    display::render_report(&report, Some(ThreatLevel::Critical), false);
}

#[tokio::test]
async fn test_phone_report_ranks_toll_free_warning_first() {
    let report = scan_report("+18005551234").await;

    assert_eq!(report.status, ScanStatus::Completed);
    assert!(report.counts.medium >= 1);
    assert_eq!(report.findings[0].threat_level, ThreatLevel::Medium);
    assert_eq!(report.findings[0].label, "Line Type");

    let rendered = display::render_json(&report, None).unwrap();
    let json: Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(json["findings"][0]["threat_level"], "medium");
}

#[test]
fn test_plugin_listing_renders_builtin_inventory() {
    let (registry, keys) = builtin_stack();
    assert_eq!(registry.len(), 5);

    // Listing and key status render over the real inventory without keys
    // configured; breach_watch shows as needing its key.
    display::render_plugin_list(&registry, &keys, false);
    display::render_plugin_list(&registry, &keys, true);
    display::render_key_status(&registry, &keys, false);

    let requirements = registry.key_requirements();
    assert!(requirements
        .iter()
        .any(|req| req.env_var == "INTELSCAN_BREACH_API_KEY"));
}
