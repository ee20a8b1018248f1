//! CLI module containing argument parsing and display functionality

pub mod args;
pub mod display;

#[cfg(test)]
mod tests;
