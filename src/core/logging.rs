//! Logging setup
//!
//! flexi_logger-backed logging with selectable formats (text, extended,
//! json), optional color, and optional file output. Level, format, and
//! output target are fixed for the process lifetime.

use flexi_logger::{FileSpec, Logger, LoggerHandle};

// The handle must outlive the process; dropping it shuts the logger down.
static LOGGER_HANDLE: std::sync::OnceLock<LoggerHandle> = std::sync::OnceLock::new();

/// Initialize process-wide logging
///
/// `log_format` selects between "text" (default), "ext" (adds the source
/// location), and "json". File output is line-per-record regardless of
/// format.
pub fn init_logging(
    log_level: Option<&str>,
    log_format: Option<&str>,
    log_file: Option<&str>,
    color_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let level_str = log_level.unwrap_or("info");
    let format_type = log_format.unwrap_or("text");

    let mut logger = Logger::try_with_str(level_str)?;

    match format_type {
        "json" => {
            logger = logger.format(json_format);
        }
        "ext" => {
            if color_enabled {
                logger = logger.format(extended_color_format);
            } else {
                logger = logger.format(extended_format);
            }
        }
        _ => {
            if color_enabled {
                logger = logger.format(simple_color_format);
            } else {
                logger = logger.format(simple_format);
            }
        }
    }

    if let Some(file_path) = log_file {
        let file_spec = FileSpec::try_from(std::path::Path::new(file_path))?;
        logger = logger.log_to_file(file_spec);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(handle);

    Ok(())
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

// "YYYY-MM-DD HH:mm:ss.fff INF message"
fn simple_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args()
    )
}

fn simple_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::*;

    let level_colored = match record.level() {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    };

    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored,
        record.args()
    )
}

// "YYYY-MM-DD HH:mm:ss.fff INF message (scanner/scheduler.rs:42)"
fn extended_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let target_formatted = format_target_as_path(record.target(), record.line());

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args(),
        target_formatted
    )
}

fn extended_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::*;

    let level_colored = match record.level() {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    };

    let target_formatted = format_target_as_path(record.target(), record.line());

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored,
        record.args(),
        target_formatted.dimmed()
    )
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use serde_json::{json, to_string};

    let json_obj = json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line()),
    });

    match to_string(&json_obj) {
        Ok(json_string) => w.write_all(json_string.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log message\"}"),
    }
}

// intelscan::scanner::scheduler -> scanner/scheduler.rs
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path_like = if let Some(without_prefix) = target.strip_prefix("intelscan::") {
        without_prefix.replace("::", "/") + ".rs"
    } else {
        target.replace("::", "/")
    };

    if let Some(line_num) = line {
        format!("{path_like}:{line_num}")
    } else {
        path_like
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_target_as_path_strips_crate_prefix() {
        assert_eq!(
            format_target_as_path("intelscan::scanner::scheduler", Some(42)),
            "scanner/scheduler.rs:42"
        );
        assert_eq!(
            format_target_as_path("reqwest::client", None),
            "reqwest/client"
        );
    }

    #[test]
    fn test_simple_format_structure() {
        let mut buffer = Vec::new();
        let mut now = flexi_logger::DeferredNow::new();
        let record = log::Record::builder()
            .level(log::Level::Info)
            .target("test_target")
            .args(format_args!("Test message"))
            .build();

        simple_format(&mut buffer, &mut now, &record).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("INF Test message"));
    }

    #[test]
    fn test_extended_format_includes_target() {
        let mut buffer = Vec::new();
        let mut now = flexi_logger::DeferredNow::new();
        let record = log::Record::builder()
            .level(log::Level::Warn)
            .target("test_target")
            .args(format_args!("something happened"))
            .build();

        extended_format(&mut buffer, &mut now, &record).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("WRN"));
        assert!(output.contains("(test_target"));
    }

    #[test]
    fn test_json_format_is_valid_json() {
        let mut buffer = Vec::new();
        let mut now = flexi_logger::DeferredNow::new();
        let record = log::Record::builder()
            .level(log::Level::Error)
            .target("test_target")
            .args(format_args!("boom"))
            .build();

        json_format(&mut buffer, &mut now, &record).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["level"], "ERR");
        assert_eq!(parsed["message"], "boom");
    }

    #[test]
    fn test_file_logger_configuration() {
        let dir = tempfile::tempdir().unwrap();
        // Building the logger is enough; starting it would claim the
        // process-global logger slot and poison the other tests.
        let logger_result = Logger::try_with_str("debug").map(|logger| {
            logger
                .log_to_file(FileSpec::default().directory(dir.path()).basename("intelscan"))
                .format(extended_format)
        });
        assert!(logger_result.is_ok());
    }

}
