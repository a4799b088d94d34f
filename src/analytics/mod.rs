//! Diagnostics for dashboard loads: the JSONL load log and its reporter.

pub mod logger;
pub mod reporter;
