//! Scan Progress Aggregation
//!
//! Tracks per-task progress fractions and publishes a single combined value
//! over a watch channel. Each dispatched task owns one slot; the combined
//! value is the arithmetic mean over all slots, so it never decreases as long
//! as slot updates are monotone, which this module enforces by ignoring
//! regressions.

use std::sync::{Arc, Mutex};
use tokio::sync::watch;

struct ProgressState {
    slots: Mutex<Vec<f64>>,
    publisher: watch::Sender<f64>,
}

/// Combined progress publisher for one scan session
pub struct ProgressAggregator {
    state: Arc<ProgressState>,
}

/// Per-task reporting handle
///
/// Handed to each plugin task; reports a fraction in `[0.0, 1.0]` into the
/// task's slot. Values outside the range are clamped, non-finite values and
/// regressions are dropped.
#[derive(Clone)]
pub struct ProgressHandle {
    slot: usize,
    state: Arc<ProgressState>,
}

impl ProgressAggregator {
    /// Create an aggregator with one slot per task
    ///
    /// A session with zero tasks is complete by definition, so the channel
    /// starts (and stays) at 1.0 in that case.
    pub fn new(task_count: usize) -> (Self, watch::Receiver<f64>) {
        let (publisher, receiver) = watch::channel(0.0);
        (Self::with_sink(task_count, publisher), receiver)
    }

    /// Create an aggregator that publishes into a caller-supplied channel
    ///
    /// Used when the subscriber end already exists, such as a progress bar
    /// wired up before the scan is dispatched.
    pub fn with_sink(task_count: usize, publisher: watch::Sender<f64>) -> Self {
        let initial = if task_count == 0 { 1.0 } else { 0.0 };
        let _ = publisher.send_replace(initial);
        let state = Arc::new(ProgressState {
            slots: Mutex::new(vec![0.0; task_count]),
            publisher,
        });
        Self { state }
    }

    /// Reporting handle for the task occupying `slot`
    pub fn handle(&self, slot: usize) -> ProgressHandle {
        ProgressHandle {
            slot,
            state: self.state.clone(),
        }
    }

    /// Mark a task's slot as finished regardless of its last report
    ///
    /// Every terminal outcome counts as full contribution, including failed,
    /// skipped, and timed-out tasks, so the combined value reaches 1.0 when
    /// the session drains.
    pub fn complete_slot(&self, slot: usize) {
        self.handle(slot).report(1.0);
    }

    /// Current combined value
    pub fn current(&self) -> f64 {
        *self.state.publisher.borrow()
    }
}

impl ProgressHandle {
    /// Report this task's progress fraction
    pub fn report(&self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);

        let combined = {
            let mut slots = match self.state.slots.lock() {
                Ok(slots) => slots,
                // A task panicking mid-report should not take progress
                // reporting down with it.
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(current) = slots.get_mut(self.slot) {
                if fraction > *current {
                    *current = fraction;
                }
            }
            if slots.is_empty() {
                1.0
            } else {
                slots.iter().sum::<f64>() / slots.len() as f64
            }
        };

        // Republish on every report, even when a regression was dropped,
        // so subscribers observe activity.
        let _ = self.state.publisher.send_replace(combined);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_value_is_mean_of_slots() {
        let (aggregator, receiver) = ProgressAggregator::new(4);
        aggregator.handle(0).report(1.0);
        aggregator.handle(1).report(0.5);

        let expected = (1.0 + 0.5) / 4.0;
        assert!((*receiver.borrow() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_regressions_are_dropped() {
        let (aggregator, receiver) = ProgressAggregator::new(2);
        let handle = aggregator.handle(0);
        handle.report(0.8);
        handle.report(0.3);

        assert!((*receiver.borrow() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_combined_value_never_decreases() {
        let (aggregator, receiver) = ProgressAggregator::new(3);
        let mut last = *receiver.borrow();
        let reports = [(0, 0.2), (1, 0.9), (0, 0.1), (2, 0.5), (1, 0.4), (2, 1.0)];
        for (slot, fraction) in reports {
            aggregator.handle(slot).report(fraction);
            let current = *receiver.borrow();
            assert!(current >= last, "combined progress regressed: {current} < {last}");
            last = current;
        }
    }

    #[test]
    fn test_out_of_range_reports_are_clamped() {
        let (aggregator, receiver) = ProgressAggregator::new(1);
        let handle = aggregator.handle(0);

        handle.report(-3.0);
        assert_eq!(*receiver.borrow(), 0.0);

        handle.report(42.0);
        assert_eq!(*receiver.borrow(), 1.0);

        handle.report(f64::NAN);
        assert_eq!(*receiver.borrow(), 1.0);
    }

    #[test]
    fn test_zero_tasks_is_already_complete() {
        let (aggregator, receiver) = ProgressAggregator::new(0);
        assert_eq!(*receiver.borrow(), 1.0);
        assert_eq!(aggregator.current(), 1.0);
    }

    #[test]
    fn test_external_sink_receives_updates() {
        let (publisher, receiver) = watch::channel(0.5);
        let aggregator = ProgressAggregator::with_sink(2, publisher);

        // Seeding resets whatever the channel held before.
        assert_eq!(*receiver.borrow(), 0.0);

        aggregator.handle(1).report(1.0);
        assert!((*receiver.borrow() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_all_slots_complete_reaches_one() {
        let (aggregator, receiver) = ProgressAggregator::new(3);
        for slot in 0..3 {
            aggregator.complete_slot(slot);
        }
        assert_eq!(*receiver.borrow(), 1.0);
    }

    #[tokio::test]
    async fn test_subscribers_observe_updates() {
        let (aggregator, mut receiver) = ProgressAggregator::new(2);
        let handle = aggregator.handle(0);

        let watcher = tokio::spawn(async move {
            receiver.changed().await.ok();
            *receiver.borrow()
        });

        handle.report(1.0);
        let observed = watcher.await.unwrap();
        assert!((observed - 0.5).abs() < 1e-9);
    }
}
