//! `repo-settings` CLI library exports for integration testing.

pub mod cli;
pub mod errors;
pub mod report;
