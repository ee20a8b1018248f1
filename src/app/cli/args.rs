//! Core CLI arguments structure and validation
//!
//! This module contains the main Args struct definition, the threat-level
//! value parser, and pre-startup validation of flag combinations.

use crate::core::finding::ThreatLevel;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Parse a threat level name case-insensitively (clap value parser)
fn parse_threat_level(value: &str) -> Result<ThreatLevel, String> {
    ThreatLevel::from_str(value).map_err(|_| {
        format!(
            "unknown threat level '{}' (expected critical, high, medium, low or unknown)",
            value
        )
    })
}

/// Extended version string with the build metadata from build.rs
fn long_version() -> String {
    format!(
        "{} (plugin api {}, {}, built {})",
        env!("CARGO_PKG_VERSION"),
        crate::core::version::get_api_version(),
        crate::core::version::git_hash(),
        crate::core::version::build_time(),
    )
}

/// Help styles from the shared palette
///
/// Help renders during parsing, before --color/--no-color take effect, so
/// TTY detection decides whether the palette applies.
fn help_styles() -> clap::builder::Styles {
    crate::core::styles::palette_to_clap(std::io::IsTerminal::is_terminal(&std::io::stdout()))
}

// Command-line options for a scan run and the two informational modes
// (--list-plugins, --key-status) that exit before any scan is scheduled.
#[derive(Parser, Debug, Clone)]
#[command(name = "intelscan")]
#[command(about = "OSINT aggregation scanner for emails, phones, IPs, usernames and more")]
#[command(version, long_version = long_version(), styles = help_styles())]
#[command(
    after_help = "TARGET may be an email, phone number, IP address, username, street address or hash; the query type is detected automatically."
)]
pub struct Args {
    /// Target to scan (email, phone, IP, username, address or hash)
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// Overall scan timeout in seconds
    #[arg(short = 't', long = "timeout", value_name = "SECONDS", default_value_t = 120)]
    pub timeout: u64,

    /// Maximum number of plugins scanning concurrently
    #[arg(long = "max-concurrent", value_name = "COUNT", default_value_t = 8)]
    pub max_concurrent: usize,

    /// Surface plugins skipped for missing API keys as report findings
    #[arg(long = "include-unconfigured")]
    pub include_unconfigured: bool,

    /// Plugins to exclude from discovery (can be repeated)
    #[arg(long = "exclude-plugin", value_name = "NAMES", action = ArgAction::Append)]
    pub plugin_exclusions: Vec<String>,

    /// Only display findings at or above this threat level
    #[arg(long = "min-threat", value_name = "LEVEL", value_parser = parse_threat_level)]
    pub min_threat: Option<ThreatLevel>,

    /// Report output format
    #[arg(long = "format", value_name = "FORMAT", value_parser = ["text", "json"], default_value = "text")]
    pub format: String,

    /// List all discovered plugins and exit
    #[arg(
        long = "list-plugins",
        help = "List all discovered plugins and their scan types"
    )]
    pub list_plugins: bool,

    /// Show API key configuration status and exit
    #[arg(long = "key-status")]
    pub key_status: bool,

    /// Force colored output even when stdout is not a terminal
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", conflicts_with = "color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check flag combinations that clap cannot express on its own.
    ///
    /// A target is mandatory unless one of the informational modes was
    /// requested; numeric options must stay above their hard minimums so the
    /// scheduler never sees a zero budget.
    pub fn validate(&self) -> Result<(), String> {
        if self.target.is_none() && !self.list_plugins && !self.key_status {
            return Err(
                "a TARGET is required unless --list-plugins or --key-status is given".to_string(),
            );
        }
        if self.timeout == 0 {
            return Err("--timeout must be at least 1 second".to_string());
        }
        if self.max_concurrent == 0 {
            return Err("--max-concurrent must be at least 1".to_string());
        }
        Ok(())
    }

    /// Resolve color output: explicit flags win, otherwise auto-detect a TTY
    pub fn color_enabled(&self) -> bool {
        if self.no_color {
            false
        } else if self.color {
            true
        } else {
            std::io::IsTerminal::is_terminal(&std::io::stdout())
        }
    }

    /// Get overall scan timeout as Duration
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for Args {
    fn default() -> Self {
        Self {
            target: None,
            timeout: 120,
            max_concurrent: 8,
            include_unconfigured: false,
            plugin_exclusions: Vec::new(),
            min_threat: None,
            format: "text".to_string(), // Default format
            list_plugins: false,
            key_status: false,
            color: false,
            no_color: false,
            log_level: None,
            log_file: None,
            log_format: None,
        }
    }
}
