//! Scanner Error Types

use std::fmt;

use serde::Serialize;

use crate::scanner::types::ScanStatus;

/// Scanner error types
///
/// These cover failures of the orchestration machinery itself. Failures of
/// individual plugin tasks are recorded per-plugin as [`TaskError`] and never
/// abort a scan.
#[derive(Debug, Clone)]
pub enum ScanError {
    /// Attempted an illegal scan status transition
    InvalidTransition { from: ScanStatus, to: ScanStatus },
    /// Invalid scheduler configuration
    Configuration { message: String },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::InvalidTransition { from, to } => {
                write!(f, "Invalid scan status transition: {} -> {}", from, to)
            }
            ScanError::Configuration { message } => write!(f, "Configuration error: {}", message),
        }
    }
}

impl std::error::Error for ScanError {}

impl crate::core::error_handling::ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ScanError::Configuration { .. } => true, // User can fix option values
            ScanError::InvalidTransition { .. } => false, // Internal state machine bug
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            ScanError::Configuration { message } => Some(message.clone()),
            _ => None,
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Per-plugin task outcome recorded in the scan session
///
/// A task error never aborts the scan; it is attached to the session under the
/// plugin's name and factored into the final scan status. Skips (missing keys,
/// cancellation before dispatch) are recorded but do not count against the
/// scan the way genuine failures do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskError {
    /// Plugin returned an error from its scan operation
    Failure { message: String },
    /// Plugin exceeded its per-plugin time budget
    TimedOut { limit_secs: u64 },
    /// Task was cancelled before it could complete
    Cancelled,
    /// Plugin was skipped because required API keys are not configured
    MissingKeys { keys: Vec<String> },
}

impl TaskError {
    /// Whether this outcome degrades the overall scan status
    ///
    /// Genuine failures and per-plugin timeouts pull a scan toward
    /// `partial`/`failed`. Skipped-unconfigured plugins and cancellation do
    /// not: the scan-level status already reflects those.
    pub fn degrades_status(&self) -> bool {
        match self {
            TaskError::Failure { .. } | TaskError::TimedOut { .. } => true,
            TaskError::Cancelled | TaskError::MissingKeys { .. } => false,
        }
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Failure { message } => write!(f, "Scan failed: {}", message),
            TaskError::TimedOut { limit_secs } => {
                write!(f, "Scan timed out after {}s", limit_secs)
            }
            TaskError::Cancelled => write!(f, "Scan cancelled"),
            TaskError::MissingKeys { keys } => {
                write!(f, "Missing API keys: {}", keys.join(", "))
            }
        }
    }
}
