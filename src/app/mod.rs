//! Application module

pub mod cli;
pub mod spinner;
pub mod startup;
