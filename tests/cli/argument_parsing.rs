//! CLI argument parsing tests
//!
//! Exercises the full command-line surface the way a shell invocation would:
//! combined flags, validation messages, and clap's own error behavior for
//! help, version, and conflicting options.

use clap::error::ErrorKind;
use clap::Parser;
use intelscan::app::cli::args::Args;
use intelscan::core::finding::ThreatLevel;
use std::time::Duration;

fn parse_ok(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).expect("arguments should parse")
}

#[test]
fn test_full_scan_invocation_round_trips_every_flag() {
    let args = parse_ok(&[
        "intelscan",
        "-t",
        "30",
        "--max-concurrent",
        "4",
        "--include-unconfigured",
        "--exclude-plugin",
        "mail_profile",
        "--exclude-plugin",
        "breach_watch",
        "--min-threat",
        "high",
        "--format",
        "json",
        "--no-color",
        "-l",
        "debug",
        "user@example.com",
    ]);

    assert_eq!(args.target.as_deref(), Some("user@example.com"));
    assert_eq!(args.timeout, 30);
    assert_eq!(args.scan_timeout(), Duration::from_secs(30));
    assert_eq!(args.max_concurrent, 4);
    assert!(args.include_unconfigured);
    assert_eq!(args.plugin_exclusions, vec!["mail_profile", "breach_watch"]);
    assert_eq!(args.min_threat, Some(ThreatLevel::High));
    assert_eq!(args.format, "json");
    assert!(args.no_color);
    assert!(!args.color_enabled());
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert!(args.validate().is_ok());
}

#[test]
fn test_defaults_match_documented_budgets() {
    let args = parse_ok(&["intelscan", "8.8.8.8"]);
    assert_eq!(args.timeout, 120);
    assert_eq!(args.max_concurrent, 8);
    assert_eq!(args.format, "text");
    assert!(args.min_threat.is_none());
    assert!(args.plugin_exclusions.is_empty());
    assert!(!args.include_unconfigured);
}

#[test]
fn test_informational_modes_do_not_need_a_target() {
    let listing = parse_ok(&["intelscan", "--list-plugins"]);
    assert!(listing.list_plugins);
    assert!(listing.validate().is_ok());

    let keys = parse_ok(&["intelscan", "--key-status"]);
    assert!(keys.key_status);
    assert!(keys.validate().is_ok());

    let bare = parse_ok(&["intelscan"]);
    let message = bare.validate().unwrap_err();
    assert!(message.contains("TARGET"));
    assert!(message.contains("--list-plugins"));
}

#[test]
fn test_zero_budgets_fail_validation_with_flag_names() {
    let args = parse_ok(&["intelscan", "-t", "0", "user@example.com"]);
    assert!(args.validate().unwrap_err().contains("--timeout"));

    let args = parse_ok(&["intelscan", "--max-concurrent", "0", "user@example.com"]);
    assert!(args.validate().unwrap_err().contains("--max-concurrent"));
}

#[test]
fn test_unknown_threat_level_names_the_accepted_set() {
    let err = Args::try_parse_from(["intelscan", "--min-threat", "severe", "x@y.example"])
        .unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("unknown threat level 'severe'"));
    assert!(rendered.contains("critical, high, medium, low or unknown"));
}

#[test]
fn test_format_restricted_to_text_and_json() {
    assert!(Args::try_parse_from(["intelscan", "--format", "yaml", "x@y.example"]).is_err());
    let args = parse_ok(&["intelscan", "--format", "text", "x@y.example"]);
    assert_eq!(args.format, "text");
}

#[test]
fn test_color_flags_conflict_is_a_clap_error() {
    let err =
        Args::try_parse_from(["intelscan", "--color", "--no-color", "x@y.example"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn test_help_and_version_use_clap_display_kinds() {
    let err = Args::try_parse_from(["intelscan", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    assert!(err.to_string().contains("TARGET"));

    let err = Args::try_parse_from(["intelscan", "--version"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn test_forced_color_overrides_tty_detection() {
    // Test processes rarely run on a TTY; --color must still win.
    let args = parse_ok(&["intelscan", "--color", "x@y.example"]);
    assert!(args.color_enabled());
}
