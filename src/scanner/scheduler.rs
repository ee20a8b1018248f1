//! Scan Scheduler
//!
//! The orchestration core. One call to [`ScanScheduler::run_scan`] fans a
//! typed target out to every applicable plugin, bounded by a global
//! concurrency cap and each plugin's own rate limiter, and drives the whole
//! set to a terminal session. Individual plugin failures never abort the
//! scan; they become synthetic findings and error-log entries. A global
//! timeout or caller cancellation stops the scan while keeping everything
//! already collected.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::core::finding::{Finding, ThreatLevel};
use crate::core::target::TargetDescriptor;
use crate::plugin::error::PluginError;
use crate::plugin::keys::ApiKeyStore;
use crate::plugin::registry::{PluginRegistry, ResolvedPlugin};
use crate::scanner::cancel::CancelToken;
use crate::scanner::error::{ScanResult, TaskError};
use crate::scanner::progress::{ProgressAggregator, ProgressHandle};
use crate::scanner::types::{ScanOptions, ScanSession, ScanStatus};

/// How long finished-but-unharvested tasks get to hand over their results
/// after a timeout or cancellation.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// What ended a task
enum TaskOutcome {
    /// Plugin returned, possibly with zero findings
    Success(Vec<Finding>),
    /// Plugin returned an error
    Failed(PluginError),
    /// Plugin exceeded its own metadata deadline
    TimedOut { limit_secs: u64 },
    /// Cancellation token fired before the plugin returned
    Cancelled,
}

/// One task's terminal report back to the join loop
struct TaskReport {
    slot: usize,
    plugin_name: String,
    display_name: String,
    outcome: TaskOutcome,
}

/// What cut the scan short, if anything
#[derive(Clone, Copy, PartialEq)]
enum Interruption {
    GlobalTimeout,
    Cancelled,
}

/// Dispatches scans against a registry and key store
pub struct ScanScheduler {
    registry: Arc<PluginRegistry>,
    keys: Arc<ApiKeyStore>,
}

impl ScanScheduler {
    pub fn new(registry: Arc<PluginRegistry>, keys: Arc<ApiKeyStore>) -> Self {
        Self { registry, keys }
    }

    /// Run one scan to a terminal session
    ///
    /// Never fails mid-scan: the only error paths are invalid options up
    /// front and the session state machine, which is a bug if it trips. The
    /// returned session is terminal and carries findings, the dispatch list,
    /// and the per-plugin error log.
    pub async fn run_scan(
        &self,
        target: TargetDescriptor,
        options: ScanOptions,
    ) -> ScanResult<ScanSession> {
        options.validate()?;
        let ScanOptions {
            timeout,
            max_concurrent,
            include_unconfigured,
            cancel,
            progress,
        } = options;

        let mut session = ScanSession::new(target);
        session.transition(ScanStatus::Running)?;

        let resolved = self.registry.resolve(session.target.scan_type);
        log::info!(
            "Scan {}: {} plugin(s) registered for {} targets",
            session.session_id,
            resolved.len(),
            session.target.scan_type
        );

        let runnable = self.partition_runnable(resolved, include_unconfigured, &mut session);
        let dispatched = runnable.len();
        let dispatched_names: Vec<String> = runnable
            .iter()
            .map(|plugin| plugin.metadata.name.clone())
            .collect();
        session.dispatched_plugins = dispatched_names.clone();

        let aggregator = match progress {
            Some(sink) => ProgressAggregator::with_sink(dispatched, sink),
            None => ProgressAggregator::new(dispatched).0,
        };
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        let mut tasks = FuturesUnordered::new();
        for (slot, plugin) in runnable.into_iter().enumerate() {
            tasks.push(run_plugin_task(
                slot,
                plugin,
                session.target.clone(),
                aggregator.handle(slot),
                semaphore.clone(),
                cancel.clone(),
            ));
        }
        log::debug!(
            "Scan {}: dispatching {} task(s), max {} concurrent",
            session.session_id,
            dispatched,
            max_concurrent
        );

        // Join loop: harvest task reports until the set drains, the global
        // timeout fires, or the caller cancels.
        let mut slot_findings: Vec<Vec<Finding>> = vec![Vec::new(); dispatched];
        let mut reported = vec![false; dispatched];
        let mut failures = 0usize;
        let mut interruption: Option<Interruption> = None;

        let global_timeout = tokio::time::sleep(timeout);
        tokio::pin!(global_timeout);
        let mut cancel_rx = cancel.subscribe();

        loop {
            tokio::select! {
                harvested = tasks.next() => match harvested {
                    Some(report) => apply_report(
                        report,
                        &mut session,
                        &mut slot_findings,
                        &mut reported,
                        &mut failures,
                        &aggregator,
                    ),
                    None => break,
                },
                _ = &mut global_timeout => {
                    log::warn!(
                        "Scan {} hit the global {}s timeout, cancelling remaining tasks",
                        session.session_id,
                        timeout.as_secs()
                    );
                    interruption = Some(Interruption::GlobalTimeout);
                    cancel.cancel();
                    break;
                }
                _ = cancel_rx.recv() => {
                    log::info!("Scan {} cancelled by caller", session.session_id);
                    interruption = Some(Interruption::Cancelled);
                    break;
                }
            }
        }

        // Give interrupted tasks a moment to report what they already have.
        if interruption.is_some() && !tasks.is_empty() {
            let drain = tokio::time::sleep(DRAIN_GRACE);
            tokio::pin!(drain);
            loop {
                tokio::select! {
                    harvested = tasks.next() => match harvested {
                        Some(report) => apply_report(
                            report,
                            &mut session,
                            &mut slot_findings,
                            &mut reported,
                            &mut failures,
                            &aggregator,
                        ),
                        None => break,
                    },
                    _ = &mut drain => break,
                }
            }
        }
        drop(tasks);

        // A cancel that landed between subscribe points still counts.
        if interruption.is_none() && cancel.is_cancelled() {
            interruption = Some(Interruption::Cancelled);
        }

        // Tasks that never reported were cut off; log them and close their
        // progress slots so the composite reaches 1.0.
        for (slot, name) in dispatched_names.iter().enumerate() {
            if !reported[slot] {
                aggregator.complete_slot(slot);
                let error = match interruption {
                    Some(Interruption::GlobalTimeout) => TaskError::TimedOut {
                        limit_secs: timeout.as_secs(),
                    },
                    _ => TaskError::Cancelled,
                };
                session.record_error(name.clone(), error);
            }
        }

        let collected_any = slot_findings.iter().any(|findings| !findings.is_empty());
        for findings in slot_findings {
            session.findings.extend(findings);
        }

        let status = if dispatched == 0 {
            ScanStatus::Completed
        } else {
            match interruption {
                Some(_) if collected_any => ScanStatus::Partial,
                Some(Interruption::GlobalTimeout) => ScanStatus::TimedOut,
                Some(Interruption::Cancelled) => ScanStatus::Cancelled,
                None if failures == 0 => ScanStatus::Completed,
                None if failures == dispatched => ScanStatus::Failed,
                None => ScanStatus::Partial,
            }
        };
        session.transition(status)?;

        log::info!(
            "Scan {} finished: {} with {} finding(s), {} error(s) logged",
            session.session_id,
            session.status,
            session.findings.len(),
            session.errors.len()
        );
        Ok(session)
    }

    /// Split resolved plugins into the dispatch set and unconfigured skips
    ///
    /// Skips always land in the error log under `MissingKeys`, which never
    /// degrades the final status; with `include_unconfigured` they also leave
    /// a MEDIUM "Configuration" finding so the report shows what a key would
    /// unlock.
    fn partition_runnable(
        &self,
        resolved: Vec<ResolvedPlugin>,
        include_unconfigured: bool,
        session: &mut ScanSession,
    ) -> Vec<ResolvedPlugin> {
        let mut runnable = Vec::with_capacity(resolved.len());
        for plugin in resolved {
            let missing = self.keys.missing_keys(&plugin.metadata);
            if missing.is_empty() {
                runnable.push(plugin);
                continue;
            }
            log::debug!(
                "Plugin '{}' skipped, missing key(s): {}",
                plugin.metadata.name,
                missing.join(", ")
            );
            if include_unconfigured {
                session.findings.push(Finding::new(
                    "Configuration",
                    format!(
                        "{} requires API key(s): {}",
                        plugin.metadata.display_name,
                        missing.join(", ")
                    ),
                    plugin.metadata.display_name.clone(),
                    ThreatLevel::Medium,
                ));
            }
            session.record_error(plugin.metadata.name.clone(), TaskError::MissingKeys {
                keys: missing,
            });
        }
        runnable
    }
}

/// Drive one plugin to a terminal outcome
///
/// Ordering is deliberate: the plugin's own rate limiter comes first, while
/// the task holds no concurrency permit, so a throttled plugin never starves
/// an unrelated one. Only then is a permit acquired and the scan invoked
/// under the plugin's metadata deadline. Cancellation is checked at every
/// stage.
async fn run_plugin_task(
    slot: usize,
    plugin: ResolvedPlugin,
    target: TargetDescriptor,
    progress: ProgressHandle,
    semaphore: Arc<Semaphore>,
    cancel: CancelToken,
) -> TaskReport {
    let ResolvedPlugin {
        metadata,
        instance,
        limiter,
    } = plugin;
    let plugin_name = metadata.name;
    let display_name = metadata.display_name;
    let report = |outcome| TaskReport {
        slot,
        plugin_name: plugin_name.clone(),
        display_name: display_name.clone(),
        outcome,
    };
    let mut cancel_rx = cancel.subscribe();

    if cancel.is_cancelled() {
        return report(TaskOutcome::Cancelled);
    }

    tokio::select! {
        _ = limiter.acquire() => {}
        _ = cancel_rx.recv() => return report(TaskOutcome::Cancelled),
    }

    let _permit = tokio::select! {
        permit = semaphore.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return report(TaskOutcome::Cancelled),
        },
        _ = cancel_rx.recv() => return report(TaskOutcome::Cancelled),
    };

    log::debug!("Plugin '{}' scanning {} target", plugin_name, target.scan_type);
    let deadline = Duration::from_secs(metadata.timeout_secs);
    let outcome = tokio::select! {
        finished = tokio::time::timeout(deadline, instance.scan(&target, progress)) => {
            match finished {
                Ok(Ok(findings)) => TaskOutcome::Success(findings),
                Ok(Err(err)) => TaskOutcome::Failed(err),
                Err(_) => TaskOutcome::TimedOut {
                    limit_secs: metadata.timeout_secs,
                },
            }
        }
        _ = cancel_rx.recv() => TaskOutcome::Cancelled,
    };

    report(outcome)
}

/// Fold one task report into the session
///
/// The single mutation point for scan state: stores findings per slot so
/// dispatch order survives the unordered join, converts failures into their
/// synthetic HIGH finding, and closes the task's progress slot.
fn apply_report(
    report: TaskReport,
    session: &mut ScanSession,
    slot_findings: &mut [Vec<Finding>],
    reported: &mut [bool],
    failures: &mut usize,
    aggregator: &ProgressAggregator,
) {
    aggregator.complete_slot(report.slot);
    reported[report.slot] = true;

    match report.outcome {
        TaskOutcome::Success(findings) => {
            log::debug!(
                "Plugin '{}' returned {} finding(s)",
                report.plugin_name,
                findings.len()
            );
            slot_findings[report.slot] = findings;
        }
        TaskOutcome::Failed(err) => {
            let message = err.to_string();
            log::warn!("Plugin '{}' failed: {}", report.plugin_name, message);
            slot_findings[report.slot] = vec![Finding::new(
                format!("Plugin Error: {}", report.display_name),
                message.clone(),
                report.display_name,
                ThreatLevel::High,
            )];
            session.record_error(report.plugin_name, TaskError::Failure { message });
            *failures += 1;
        }
        TaskOutcome::TimedOut { limit_secs } => {
            log::warn!(
                "Plugin '{}' exceeded its {}s deadline",
                report.plugin_name,
                limit_secs
            );
            session.record_error(report.plugin_name, TaskError::TimedOut { limit_secs });
            *failures += 1;
        }
        TaskOutcome::Cancelled => {
            log::debug!("Plugin '{}' cancelled", report.plugin_name);
            session.record_error(report.plugin_name, TaskError::Cancelled);
        }
    }
}
