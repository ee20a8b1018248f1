//! Strict query parsing
//!
//! Parses a raw target string into a [`TargetDescriptor`]. Two input forms
//! are recognized: a single bare target classified by shape heuristics, and
//! the structured `field:"value"` grammar with explicit scan-type selection
//! and filter fields. Malformed input fails fast with an actionable reason —
//! an unknown field or a bad value is never silently dropped, because a
//! silently ignored filter would make the user believe a constraint was
//! applied when it was not.
//!
//! The parser is a pure function of its input string and the closed field
//! set; it performs no I/O.

use crate::core::error_handling::ContextualError;
use crate::core::target::{ScanType, TargetDescriptor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

/// Filter fields accepted in structured queries alongside scan-type fields
pub const FILTER_FIELDS: [&str; 2] = ["name", "location"];

/// Every field name the grammar accepts, for diagnostics
pub const SUPPORTED_FIELDS: [&str; 8] = [
    "email", "phone", "ip", "username", "address", "hash", "name", "location",
];

static FIELD_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^([a-zA-Z_]+):"([^"]*)"$"#).expect("valid regex"));
static FIELD_SIMPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^([a-zA-Z_]+):([^"\s]+)$"#).expect("valid regex"));
static FIELD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_]+:").expect("valid regex"));

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));
static PHONE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s\-\(\)]{10,}$").expect("valid regex"));
static USERNAME_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{3,30}$").expect("valid regex"));
static HASH_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-fA-F0-9]{32,128}$").expect("valid regex"));

/// Query parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty query not allowed")]
    EmptyQuery,
    #[error("Unclosed quote in query near '{partial}'")]
    UnterminatedQuote { partial: String },
    #[error("Invalid field format: {token}")]
    MalformedToken { token: String },
    #[error("Unsupported field: {field}")]
    UnknownField { field: String },
    #[error("missing scan-type field")]
    MissingScanTypeField,
    #[error("Multiple bare targets not allowed: '{second}'")]
    MultipleBareTargets { second: String },
    #[error("Invalid {field} value: '{value}'")]
    InvalidValue { field: String, value: String },
    #[error("No valid target found: '{token}'")]
    UnrecognizedTarget { token: String },
}

impl ParseError {
    /// Usage hint matched to the failure, shown beneath the error message
    pub fn suggestion(&self) -> String {
        match self {
            ParseError::EmptyQuery => "Example: email:\"user@domain.com\"".to_string(),
            ParseError::UnterminatedQuote { .. } => {
                "Ensure all quoted values are closed".to_string()
            }
            ParseError::MalformedToken { .. } => {
                "Use format: field:\"value\" or field:value".to_string()
            }
            ParseError::UnknownField { .. } => {
                format!("Supported fields: {}", SUPPORTED_FIELDS.join(", "))
            }
            ParseError::MissingScanTypeField => {
                "Add one of: email:, phone:, ip:, username:, address:, hash:".to_string()
            }
            ParseError::MultipleBareTargets { .. } => {
                "Use field:\"value\" format for all targets".to_string()
            }
            ParseError::InvalidValue { field, .. } => match field.as_str() {
                "email" => "Use format: user@domain.com".to_string(),
                "phone" => "Use format: +1234567890 or (123) 456-7890".to_string(),
                "ip" => "Use format: 192.168.1.1 or 2001:db8::1".to_string(),
                "username" => "Username must be 3-30 chars, alphanumeric plus _-".to_string(),
                "hash" => "Hash must be 32-128 hex characters".to_string(),
                _ => "Provide a non-empty value".to_string(),
            },
            ParseError::UnrecognizedTarget { .. } => {
                "Example: user@example.com, 192.168.1.1, or email:\"user@domain.com\"".to_string()
            }
        }
    }
}

impl ContextualError for ParseError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<String> {
        Some(format!("{}. {}", self, self.suggestion()))
    }
}

/// Parse a raw query string into a target descriptor
///
/// # Examples
/// ```
/// use intelscan::core::query::parse;
/// use intelscan::core::target::ScanType;
///
/// let descriptor = parse("email:\"user@example.com\"").unwrap();
/// assert_eq!(descriptor.scan_type, ScanType::Email);
/// assert_eq!(descriptor.normalized_value, "user@example.com");
///
/// let descriptor = parse("203.0.113.7").unwrap();
/// assert_eq!(descriptor.scan_type, ScanType::Ip);
/// ```
pub fn parse(input: &str) -> Result<TargetDescriptor, ParseError> {
    let query = input.trim();
    if query.is_empty() {
        return Err(ParseError::EmptyQuery);
    }

    let tokens = tokenize(query)?;

    let mut primary: Option<(ScanType, String)> = None;
    let mut bare: Option<String> = None;
    let mut fields: BTreeMap<String, String> = BTreeMap::new();

    for token in &tokens {
        match split_field_token(token) {
            Some(Ok((field, value))) => {
                if let Ok(scan_type) = ScanType::from_str(&field) {
                    let normalized = validate_typed_value(scan_type, &value)?;
                    if primary.is_none() && bare.is_none() {
                        primary = Some((scan_type, normalized));
                    } else {
                        fields.insert(field, normalized);
                    }
                } else if FILTER_FIELDS.contains(&field.as_str()) {
                    if value.trim().is_empty() {
                        return Err(ParseError::InvalidValue { field, value });
                    }
                    fields.insert(field, value);
                } else {
                    return Err(ParseError::UnknownField { field });
                }
            }
            Some(Err(err)) => return Err(err),
            None => {
                // Bare token. Only one target may be given without a field.
                if primary.is_some() || bare.is_some() {
                    return Err(ParseError::MultipleBareTargets {
                        second: token.clone(),
                    });
                }
                bare = Some(token.clone());
            }
        }
    }

    let (scan_type, normalized_value) = match (primary, bare) {
        (Some(primary), _) => primary,
        (None, Some(token)) => detect_bare_target(&token)?,
        (None, None) => return Err(ParseError::MissingScanTypeField),
    };

    Ok(TargetDescriptor {
        raw_input: input.to_string(),
        scan_type,
        normalized_value,
        structured_fields: fields,
    })
}

/// Split a query into tokens, keeping quoted spans intact
///
/// Quotes stay attached to their token so field parsing can distinguish
/// `field:"value"` from `field:value`. An unclosed quote fails with the
/// partial token collected so far.
fn tokenize(query: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote_char: Option<char> = None;

    for ch in query.chars() {
        match quote_char {
            None if ch == '"' || ch == '\'' => {
                quote_char = Some(ch);
                current.push(ch);
            }
            Some(open) if ch == open => {
                quote_char = None;
                current.push(ch);
            }
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if quote_char.is_some() {
        return Err(ParseError::UnterminatedQuote { partial: current });
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

/// Recognize a `field:value` token, or None for a bare-target candidate
///
/// A token is field-form only when it starts with a `[a-zA-Z_]+:` prefix;
/// this keeps bare IPv6 literals like `2001:db8::1` out of the field grammar.
fn split_field_token(token: &str) -> Option<Result<(String, String), ParseError>> {
    if let Some(caps) = FIELD_QUOTED.captures(token) {
        return Some(Ok((caps[1].to_string(), caps[2].to_string())));
    }
    if !token.contains('"') {
        if let Some(caps) = FIELD_SIMPLE.captures(token) {
            return Some(Ok((caps[1].to_string(), caps[2].to_string())));
        }
    }
    if FIELD_PREFIX.is_match(token) {
        return Some(Err(ParseError::MalformedToken {
            token: token.to_string(),
        }));
    }
    None
}

/// Validate a field value against its scan type, returning the normalized form
fn validate_typed_value(scan_type: ScanType, value: &str) -> Result<String, ParseError> {
    let invalid = || ParseError::InvalidValue {
        field: scan_type.to_string(),
        value: value.to_string(),
    };

    match scan_type {
        ScanType::Email => {
            if EMAIL_SHAPE.is_match(value) {
                Ok(value.to_string())
            } else {
                Err(invalid())
            }
        }
        ScanType::Phone => {
            if PHONE_SHAPE.is_match(value) {
                Ok(value.trim().to_string())
            } else {
                Err(invalid())
            }
        }
        ScanType::Ip => match IpAddr::from_str(value) {
            Ok(addr) => Ok(addr.to_string()),
            Err(_) => Err(invalid()),
        },
        ScanType::Username => {
            if USERNAME_SHAPE.is_match(value) {
                Ok(value.to_string())
            } else {
                Err(invalid())
            }
        }
        ScanType::Hash => {
            if HASH_SHAPE.is_match(value) {
                Ok(value.to_string())
            } else {
                Err(invalid())
            }
        }
        ScanType::Address => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(invalid())
            } else {
                Ok(trimmed.to_string())
            }
        }
    }
}

/// Classify a bare token by shape, applying the fixed precedence order
///
/// Precedence: email > IP > phone > hash > username > address. Address is
/// reachable only for quoted input — a bare unquoted word that matches no
/// other shape is rejected rather than guessed at.
fn detect_bare_target(token: &str) -> Result<(ScanType, String), ParseError> {
    let (content, was_quoted) = strip_quotes(token);
    let content = content.trim();

    let unrecognized = || ParseError::UnrecognizedTarget {
        token: token.to_string(),
    };

    if content.is_empty() {
        return Err(unrecognized());
    }
    if EMAIL_SHAPE.is_match(content) {
        return Ok((ScanType::Email, content.to_string()));
    }
    if let Ok(addr) = IpAddr::from_str(content) {
        return Ok((ScanType::Ip, addr.to_string()));
    }
    if PHONE_SHAPE.is_match(content) {
        return Ok((ScanType::Phone, content.to_string()));
    }
    if HASH_SHAPE.is_match(content) {
        return Ok((ScanType::Hash, content.to_string()));
    }
    if let Some(handle) = content.strip_prefix('@') {
        if USERNAME_SHAPE.is_match(handle) {
            return Ok((ScanType::Username, handle.to_string()));
        }
        return Err(unrecognized());
    }
    if USERNAME_SHAPE.is_match(content) {
        return Ok((ScanType::Username, content.to_string()));
    }
    if was_quoted {
        return Ok((ScanType::Address, content.to_string()));
    }

    Err(unrecognized())
}

/// Strip one matching pair of surrounding quotes, reporting whether any were present
fn strip_quotes(token: &str) -> (&str, bool) {
    for quote in ['"', '\''] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return (&token[1..token.len() - 1], true);
        }
    }
    (token, false)
}
