//! Common test utilities and helpers
//!
//! This module provides shared functionality for integration tests:
//! mock plugins, registry construction, and target fixtures built through
//! the public crate API only.

pub mod mock_plugins;
