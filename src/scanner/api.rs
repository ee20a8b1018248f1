//! Public API for the scanner system
//!
//! This module provides the complete public API for the scanner system.
//! External modules should import from here rather than directly from
//! internal modules.

// Scan scheduling
pub use crate::scanner::scheduler::ScanScheduler;

// Session model and options
pub use crate::scanner::types::{
    ScanOptions, ScanSession, ScanStatus, DEFAULT_MAX_CONCURRENT, DEFAULT_SCAN_TIMEOUT,
};

// Error handling
pub use crate::scanner::error::{ScanError, ScanResult, TaskError};

// Reporting
pub use crate::scanner::report::{ScanReport, ThreatCounts};

// Progress and cancellation
pub use crate::scanner::cancel::CancelToken;
pub use crate::scanner::progress::{ProgressAggregator, ProgressHandle};

// Rate limiting
pub use crate::scanner::rate_limit::RateLimiter;
