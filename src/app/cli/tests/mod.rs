//! Tests for the CLI module
//!
//! This module contains all tests for CLI argument parsing, validation,
//! and report rendering, extracted from individual modules for better
//! organization.
