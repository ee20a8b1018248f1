//! Target detection and structured query tests
//!
//! Covers the user-visible contract of the query grammar: bare-target
//! detection precedence, the `field:"value"` escape hatch, actionable error
//! suggestions, and the canonical query string round trip.

use intelscan::core::query::{parse, ParseError};
use intelscan::core::target::ScanType;

#[test]
fn test_bare_target_detection_precedence() {
    let cases = [
        ("user@example.com", ScanType::Email, "user@example.com"),
        ("192.168.1.1", ScanType::Ip, "192.168.1.1"),
        ("2001:db8::1", ScanType::Ip, "2001:db8::1"),
        ("fe80::1", ScanType::Ip, "fe80::1"),
        ("+12025550143", ScanType::Phone, "+12025550143"),
        (
            "5d41402abc4b2a76b9719d911017c592",
            ScanType::Hash,
            "5d41402abc4b2a76b9719d911017c592",
        ),
        // Short hex reads as a username, not a truncated hash.
        ("deadbeef", ScanType::Username, "deadbeef"),
        ("johndoe", ScanType::Username, "johndoe"),
        ("@johndoe", ScanType::Username, "johndoe"),
        (
            "\"123 Main St, Springfield\"",
            ScanType::Address,
            "123 Main St, Springfield",
        ),
    ];

    for (input, scan_type, normalized) in cases {
        let descriptor = parse(input).unwrap_or_else(|err| panic!("{input}: {err}"));
        assert_eq!(descriptor.scan_type, scan_type, "input: {input}");
        assert_eq!(descriptor.normalized_value, normalized, "input: {input}");
    }
}

#[test]
fn test_quoted_phone_keeps_formatting_characters() {
    let descriptor = parse("\"+1 (202) 555-0143\"").unwrap();
    assert_eq!(descriptor.scan_type, ScanType::Phone);
    assert_eq!(descriptor.normalized_value, "+1 (202) 555-0143");
}

#[test]
fn test_explicit_field_overrides_detection() {
    // Bare "Springfield" would detect as a username; the field forces it.
    let descriptor = parse("address:Springfield").unwrap();
    assert_eq!(descriptor.scan_type, ScanType::Address);
    assert_eq!(descriptor.normalized_value, "Springfield");

    // An all-hex-letter IPv6 group looks like a field prefix, so the ip:
    // field is the supported spelling.
    let descriptor = parse("ip:\"face::1\"").unwrap();
    assert_eq!(descriptor.scan_type, ScanType::Ip);
    assert_eq!(descriptor.normalized_value, "face::1");
}

#[test]
fn test_filter_fields_ride_along_with_the_target() {
    let descriptor =
        parse("email:\"user@example.com\" name:\"John Doe\" location:\"Boston, MA\"").unwrap();
    assert_eq!(descriptor.scan_type, ScanType::Email);
    assert_eq!(descriptor.field("name"), Some("John Doe"));
    assert_eq!(descriptor.field("location"), Some("Boston, MA"));
}

#[test]
fn test_unknown_field_error_lists_supported_fields() {
    let err = parse("breach:user@example.com").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnknownField {
            field: "breach".to_string()
        }
    );
    assert!(err.suggestion().contains("Supported fields"));
}

#[test]
fn test_multiple_bare_targets_are_rejected() {
    let err = parse("user@example.com 192.168.1.1").unwrap_err();
    assert!(matches!(
        err,
        ParseError::MultipleBareTargets { ref second } if second == "192.168.1.1"
    ));
    assert!(err.suggestion().contains("field:\"value\""));
}

#[test]
fn test_unrecognized_target_suggests_examples() {
    let err = parse("???").unwrap_err();
    assert!(matches!(err, ParseError::UnrecognizedTarget { .. }));
    assert!(err.suggestion().contains("user@example.com"));
}

#[test]
fn test_unterminated_quote_reports_partial_token() {
    let err = parse("email:\"unclosed").unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnterminatedQuote { ref partial } if partial.contains("unclosed")
    ));
}

#[test]
fn test_canonical_query_string_round_trips() {
    let first = parse("email:\"user@example.com\" name:\"John Doe\"").unwrap();
    let canonical = first.to_query_string();
    assert_eq!(canonical, "email:\"user@example.com\" name:\"John Doe\"");

    let second = parse(&canonical).unwrap();
    // Equality is semantic; raw input strings may differ.
    assert_eq!(first, second);
}

#[test]
fn test_bare_detection_round_trips_through_field_form() {
    for input in ["user@example.com", "203.0.113.7", "@ghostwriter"] {
        let detected = parse(input).unwrap();
        let reparsed = parse(&detected.to_query_string()).unwrap();
        assert_eq!(detected, reparsed, "input: {input}");
    }
}
