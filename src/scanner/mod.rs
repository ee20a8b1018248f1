//! Scan Orchestration Module
//!
//! The concurrent engine behind a scan: scheduling plugin tasks under rate
//! and concurrency limits, aggregating progress, tolerating partial failure,
//! and assembling the ranked report.

// Internal modules - all access should go through api module
pub(crate) mod cancel;
pub(crate) mod error;
pub(crate) mod progress;
pub(crate) mod rate_limit;
pub(crate) mod report;
pub(crate) mod scheduler;
pub(crate) mod types;

// Public API module - the only public interface for the scanner system
pub mod api;

#[cfg(test)]
mod tests;
