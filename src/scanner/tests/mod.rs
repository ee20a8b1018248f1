//! Test modules for the scanner system
//!
//! This module organizes the test suites for the scan scheduler, with shared
//! mock plugins and fixtures in `helpers`.

pub mod helpers;
