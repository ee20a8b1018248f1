//! Scan Session Types
//!
//! The session model shared across the scanner module: scan status state
//! machine, scheduler options, and the mutable session aggregate the
//! scheduler owns for the lifetime of one scan.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use strum_macros::Display;
use tokio::sync::watch;

use crate::core::finding::Finding;
use crate::core::target::TargetDescriptor;
use crate::scanner::cancel::CancelToken;
use crate::scanner::error::{ScanError, ScanResult, TaskError};

/// Default wall-clock budget for a whole scan
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(120);

/// Default cap on concurrently executing plugin tasks
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Lifecycle states of a scan session
///
/// `Pending` and `Running` are transient; the other five are terminal and
/// mutually exclusive. [`ScanSession::transition`] enforces the machine:
/// pending moves only to running, running moves to exactly one terminal
/// state, and terminal states never move again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Pending,
    Running,
    /// Every dispatched task succeeded (or nothing was dispatched)
    Completed,
    /// Some tasks succeeded, some failed or were cut short
    Partial,
    /// Every dispatched task errored
    Failed,
    /// Caller cancelled before anything was collected
    Cancelled,
    /// Global timeout elapsed before anything was collected
    TimedOut,
}

impl ScanStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanStatus::Pending | ScanStatus::Running)
    }

    /// Whether the state machine permits moving from `self` to `to`
    pub fn can_transition(&self, to: ScanStatus) -> bool {
        match self {
            ScanStatus::Pending => to == ScanStatus::Running,
            ScanStatus::Running => to.is_terminal(),
            _ => false,
        }
    }
}

/// Caller-supplied knobs for one scan run
///
/// `progress` is an optional externally owned watch channel; when set, the
/// scheduler seeds and publishes composite progress into it. `cancel` is
/// shared with the caller so Ctrl-C handling can reach into a running scan.
pub struct ScanOptions {
    /// Wall-clock budget for the whole scan
    pub timeout: Duration,
    /// Cap on concurrently executing plugin tasks
    pub max_concurrent: usize,
    /// Surface unconfigured plugins as MEDIUM findings instead of skipping
    /// them silently
    pub include_unconfigured: bool,
    /// Cancellation token observed by every task of the scan
    pub cancel: CancelToken,
    /// Composite progress sink, if the caller wants updates
    pub progress: Option<watch::Sender<f64>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SCAN_TIMEOUT,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            include_unconfigured: false,
            cancel: CancelToken::new(),
            progress: None,
        }
    }
}

impl ScanOptions {
    /// Check option values before a scan starts
    pub fn validate(&self) -> ScanResult<()> {
        if self.max_concurrent == 0 {
            return Err(ScanError::Configuration {
                message: "max_concurrent must be at least 1".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ScanError::Configuration {
                message: "timeout must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Mutable state of one scan, owned by the scheduler until terminal
///
/// Findings are append-only while the scan runs, ordered by dispatch slot
/// then emission within a plugin. The error log keys per-plugin task
/// outcomes by plugin name. Once a terminal status is reached the session is
/// handed to the caller and never mutated again.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSession {
    pub session_id: String,
    pub target: TargetDescriptor,
    pub status: ScanStatus,
    /// Plugin names in dispatch order
    pub dispatched_plugins: Vec<String>,
    pub findings: Vec<Finding>,
    pub errors: BTreeMap<String, TaskError>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ScanSession {
    /// Create a pending session for `target`
    pub fn new(target: TargetDescriptor) -> Self {
        let started_at = Utc::now();
        let session_id = generate_session_id(&target.normalized_value, started_at);
        Self {
            session_id,
            target,
            status: ScanStatus::Pending,
            dispatched_plugins: Vec::new(),
            findings: Vec::new(),
            errors: BTreeMap::new(),
            started_at,
            ended_at: None,
        }
    }

    /// Move the session to `to`, enforcing the status state machine
    ///
    /// Reaching a terminal status stamps `ended_at`.
    pub fn transition(&mut self, to: ScanStatus) -> ScanResult<()> {
        if !self.status.can_transition(to) {
            return Err(ScanError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        if to.is_terminal() {
            self.ended_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Attach a task outcome to the per-plugin error log
    pub fn record_error(&mut self, plugin_name: impl Into<String>, error: TaskError) {
        self.errors.insert(plugin_name.into(), error);
    }

    /// Wall-clock duration, available once the session is terminal
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.ended_at.map(|ended| ended - self.started_at)
    }
}

/// Derive a session id from the target and start time
///
/// SHA-256 over the normalized value and the start timestamp, truncated to
/// 16 hex characters under a `scan-` prefix. Stable for identical inputs so
/// id generation is testable; distinct across runs because the timestamp
/// participates.
fn generate_session_id(normalized_value: &str, started_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_value.as_bytes());
    hasher.update(started_at.timestamp_micros().to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("scan-{}", &digest[..16])
}
