//! Core services and infrastructure

pub mod error_handling;
pub mod finding;
pub mod logging;
pub mod query;
pub mod styles;
pub mod target;
pub mod version;
