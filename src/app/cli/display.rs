//! CLI display utilities for formatting output
//!
//! All user-facing rendering goes through here so the text and JSON paths
//! agree on what a filtered report contains. Color is routed through
//! `StyleRole` and its prettytable bridge; every function takes an explicit
//! `use_color` flag instead of consulting a global.

use crate::core::finding::{Finding, ThreatLevel};
use crate::core::styles::StyleRole;
use crate::plugin::api::{ApiKeyStore, PluginRegistry};
use crate::scanner::api::{ScanReport, ScanStatus, ThreatCounts};
use prettytable::{format, Cell, Row, Table};

/// Longest finding value rendered in a table cell before truncation
const MAX_VALUE_WIDTH: usize = 72;

fn styled_cell(text: &str, role: StyleRole, use_color: bool) -> Cell {
    let cell = Cell::new(text);
    if use_color {
        if let Some(spec) = role.to_prettytable_spec() {
            return cell.style_spec(&spec);
        }
    }
    cell
}

fn title_cell(text: &str, use_color: bool) -> Cell {
    if use_color {
        if let Some(spec) = StyleRole::Header.to_prettytable_spec() {
            return Cell::new(text).style_spec(&format!("b{spec}"));
        }
    }
    Cell::new(text)
}

/// Truncate on a char boundary, appending an ellipsis when content was cut
pub(super) fn truncate_value(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn status_role(status: ScanStatus) -> StyleRole {
    match status {
        ScanStatus::Completed => StyleRole::Valid,
        ScanStatus::Partial => StyleRole::Header,
        ScanStatus::Failed | ScanStatus::Cancelled | ScanStatus::TimedOut => StyleRole::Error,
        ScanStatus::Pending | ScanStatus::Running => StyleRole::Accent,
    }
}

/// One-line tally of findings per threat level, highest first
pub(super) fn summary_line(counts: &ThreatCounts, use_color: bool) -> String {
    let mut parts = Vec::new();
    for (count, level) in [
        (counts.critical, ThreatLevel::Critical),
        (counts.high, ThreatLevel::High),
        (counts.medium, ThreatLevel::Medium),
        (counts.low, ThreatLevel::Low),
        (counts.unknown, ThreatLevel::Unknown),
    ] {
        if count > 0 {
            parts.push(StyleRole::for_threat(level).paint(
                &format!("{} {}", count, level.to_string().to_lowercase()),
                use_color,
            ));
        }
    }

    let total = counts.total();
    if total == 0 {
        return "0 findings".to_string();
    }
    format!(
        "{} finding{}: {}",
        total,
        if total == 1 { "" } else { "s" },
        parts.join(", ")
    )
}

/// Print the scan report in human-readable form.
///
/// `min_threat` hides findings below the given level from the table; the
/// summary counts always reflect the full tally so the header stays honest
/// about what the scan produced.
pub fn render_report(report: &ScanReport, min_threat: Option<ThreatLevel>, use_color: bool) {
    let key = |text: &str| StyleRole::Key.paint(text, use_color);

    println!();
    println!("{}", StyleRole::Header.paint("Scan Report", use_color));
    println!("  {}  {}", key("Target:  "), report.target);
    println!("  {}  {}", key("Session: "), report.session_id);
    println!(
        "  {}  {}",
        key("Status:  "),
        status_role(report.status).paint(&report.status.to_string(), use_color)
    );
    println!("  {}  {:.2}s", key("Duration:"), report.duration_secs);
    let dispatched = if report.dispatched_plugins.is_empty() {
        "none".to_string()
    } else {
        report.dispatched_plugins.join(", ")
    };
    println!("  {}  {}", key("Plugins: "), dispatched);

    let shown: Vec<&Finding> = match min_threat {
        Some(min) => report.findings_at_or_above(min),
        None => report.findings.iter().collect(),
    };
    let hidden = report.findings.len() - shown.len();

    println!();
    if shown.is_empty() {
        println!("No findings.");
    } else {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.set_titles(Row::new(vec![
            title_cell("Threat", use_color),
            title_cell("Finding", use_color),
            title_cell("Value", use_color),
            title_cell("Source", use_color),
        ]));
        for finding in shown {
            table.add_row(Row::new(vec![
                styled_cell(
                    &finding.threat_level.to_string(),
                    StyleRole::for_threat(finding.threat_level),
                    use_color,
                ),
                Cell::new(&finding.label),
                Cell::new(&truncate_value(&finding.value, MAX_VALUE_WIDTH)),
                styled_cell(&finding.source, StyleRole::Accent, use_color),
            ]));
        }
        let _ = table.print_tty(use_color);

        println!();
        println!("{}", summary_line(&report.counts, use_color));
    }

    if let Some(min) = min_threat {
        if hidden > 0 {
            println!(
                "{}",
                StyleRole::Dim.paint(
                    &format!(
                        "({} finding{} below {} hidden)",
                        hidden,
                        if hidden == 1 { "" } else { "s" },
                        min
                    ),
                    use_color
                )
            );
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("{}", StyleRole::Header.paint("Plugin errors", use_color));
        for (name, error) in &report.errors {
            println!("  {}: {}", StyleRole::Invalid.paint(name, use_color), error);
        }
    }
}

/// Serialize the report as pretty-printed JSON.
///
/// `min_threat` filters the findings array the same way the text renderer
/// does; `counts` keep the unfiltered tally.
pub fn render_json(
    report: &ScanReport,
    min_threat: Option<ThreatLevel>,
) -> serde_json::Result<String> {
    let mut filtered = report.clone();
    if let Some(min) = min_threat {
        filtered
            .findings
            .retain(|finding| finding.threat_level >= min);
    }
    serde_json::to_string_pretty(&filtered)
}

/// Print the discovered plugin inventory, grouped by category
pub fn render_plugin_list(registry: &PluginRegistry, keys: &ApiKeyStore, use_color: bool) {
    if registry.is_empty() {
        eprintln!("No plugins discovered.");
        return;
    }

    let mut plugins: Vec<_> = registry.plugins().collect();
    plugins.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(vec![
        title_cell("Plugin", use_color),
        title_cell("Category", use_color),
        title_cell("Scan Types", use_color),
        title_cell("Rate/min", use_color),
        title_cell("Status", use_color),
    ]));

    for metadata in plugins.iter().copied() {
        let scan_types = metadata
            .supported_scan_types
            .iter()
            .map(|scan_type| scan_type.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let rate = if metadata.rate_limit_per_minute == 0 {
            "-".to_string()
        } else {
            metadata.rate_limit_per_minute.to_string()
        };
        let (state, role) = if keys.is_configured(metadata) {
            ("ready", StyleRole::Valid)
        } else {
            ("needs key", StyleRole::Invalid)
        };
        table.add_row(Row::new(vec![
            styled_cell(&metadata.name, StyleRole::Literal, use_color),
            Cell::new(&metadata.category.to_string()),
            Cell::new(&scan_types),
            Cell::new(&rate),
            styled_cell(state, role, use_color),
        ]));
    }
    let _ = table.print_tty(use_color);

    println!();
    println!(
        "{} plugin{} discovered.",
        plugins.len(),
        if plugins.len() == 1 { "" } else { "s" }
    );
}

/// Print API key configuration status with masked values
pub fn render_key_status(registry: &PluginRegistry, keys: &ApiKeyStore, use_color: bool) {
    let requirements = registry.key_requirements();
    if requirements.is_empty() {
        println!("No plugins declare API keys.");
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(vec![
        title_cell("Key", use_color),
        title_cell("Environment", use_color),
        title_cell("Required", use_color),
        title_cell("Value", use_color),
    ]));

    let mut unset_required = Vec::new();
    for requirement in requirements.iter().copied() {
        let required = if requirement.is_required {
            "yes"
        } else {
            "optional"
        };
        let value_cell = match keys.masked(&requirement.key_name) {
            Some(masked) => styled_cell(&masked, StyleRole::Key, use_color),
            None => {
                if requirement.is_required {
                    unset_required.push(requirement);
                }
                styled_cell("not set", StyleRole::Dim, use_color)
            }
        };
        table.add_row(Row::new(vec![
            styled_cell(&requirement.display_name, StyleRole::Literal, use_color),
            Cell::new(&requirement.env_var),
            Cell::new(required),
            value_cell,
        ]));
    }
    let _ = table.print_tty(use_color);

    if !unset_required.is_empty() {
        println!();
        for requirement in unset_required {
            println!(
                "{}",
                StyleRole::Dim.paint(
                    &format!(
                        "{}: set {} (sign up at {})",
                        requirement.display_name, requirement.env_var, requirement.signup_url
                    ),
                    use_color
                )
            );
        }
    }
}
