//! CLI library components for the CDA extractor.

pub mod cli;
pub mod commands;
pub mod logging;
