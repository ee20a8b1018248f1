//! CLI Integration Test Modules
//!
//! Organized CLI integration tests split into focused modules for better
//! maintainability.

pub mod argument_parsing;
pub mod query_detection;
pub mod report_output;
