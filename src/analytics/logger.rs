use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::FetchError;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Load log entry (JSONL diagnostics)
// ---------------------------------------------------------------------------

/// How a logged step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOutcome {
    Ok,
    /// Backend answered with a non-2xx status.
    Status,
    /// Request never got an HTTP answer.
    Transport,
    /// Answer body could not be decoded.
    Decode,
    /// A renderer fell back to its empty state.
    Degraded,
    /// The whole page fell back to defaults.
    Fallback,
    /// Generation request answered `success: false`.
    Rejected,
}

impl LogOutcome {
    pub fn is_failure(self) -> bool {
        !matches!(self, Self::Ok)
    }
}

impl From<&FetchError> for LogOutcome {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::Transport(_) => Self::Transport,
            FetchError::Status(_) => Self::Status,
            FetchError::Decode(_) => Self::Decode,
        }
    }
}

/// A single entry in the load log (`~/.vitalboard/load-log.jsonl`).
///
/// One entry is written per backend fetch, per renderer degradation, per
/// fallback render and per generation trigger. `vitalboard log` reads them
/// back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadLogEntry {
    pub timestamp: String,
    /// `member`, `stats`, `health_metrics`, `timeline`, `generation`, or a
    /// renderer name.
    pub source: String,
    pub outcome: LogOutcome,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub latency_ms: Option<u64>,
}

impl LoadLogEntry {
    pub fn new(source: &str, outcome: LogOutcome) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            source: source.to_string(),
            outcome,
            detail: None,
            latency_ms: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Best-effort diagnostics sink for one dashboard session.
///
/// Appends to the JSONL load log when a path is set and echoes warnings to
/// stderr when verbose. Write failures are ignored: logging never changes
/// what the page shows.
#[derive(Debug, Clone, Default)]
pub struct LoadLog {
    path: Option<PathBuf>,
    verbose: bool,
}

impl LoadLog {
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            path: if config.enabled {
                load_log_path()
            } else {
                None
            },
            verbose: config.verbose,
        }
    }

    /// A log that records nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Write to an explicit file instead of the home directory.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            verbose: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&self, entry: LoadLogEntry) {
        if self.verbose && entry.outcome.is_failure() {
            eprintln!(
                "[vitalboard] {} {:?}: {}",
                entry.source,
                entry.outcome,
                entry.detail.as_deref().unwrap_or("-")
            );
        }
        if let Some(path) = &self.path {
            let _ = append_entry(path, &entry);
        }
    }

    pub fn fetch_ok(&self, source: &str, latency_ms: u64) {
        self.record(LoadLogEntry::new(source, LogOutcome::Ok).with_latency(latency_ms));
    }

    pub fn fetch_failed(&self, source: &str, err: &FetchError, latency_ms: u64) {
        self.record(
            LoadLogEntry::new(source, LogOutcome::from(err))
                .with_detail(err.to_string())
                .with_latency(latency_ms),
        );
    }

    /// A renderer could not show its data and fell back to its empty state.
    pub fn degraded(&self, source: &str, detail: impl std::fmt::Display) {
        self.record(LoadLogEntry::new(source, LogOutcome::Degraded).with_detail(detail.to_string()));
    }
}

fn append_entry(path: &Path, entry: &LoadLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read every entry from the log at `path`.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_entries(path: &Path) -> Vec<LoadLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<LoadLogEntry>(&line).ok())
        .collect()
}

/// The newest `limit` entries, oldest first.
pub fn read_recent(path: &Path, limit: usize) -> Vec<LoadLogEntry> {
    let mut entries = read_entries(path);
    let skip = entries.len().saturating_sub(limit);
    entries.drain(..skip);
    entries
}

/// Return the path to the load log file.
pub fn load_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vitalboard").join("load-log.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("vitalboard-logger-{}-{name}", std::process::id()))
            .join("load-log.jsonl");
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn entries_round_trip_through_file() {
        let path = temp_log("round-trip");
        let log = LoadLog::at(&path);
        log.fetch_ok("stats", 12);
        log.fetch_failed("timeline", &FetchError::Status(503), 40);

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].outcome, LogOutcome::Ok);
        assert_eq!(entries[0].latency_ms, Some(12));
        assert_eq!(entries[1].source, "timeline");
        assert_eq!(entries[1].outcome, LogOutcome::Status);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let path = temp_log("malformed");
        let log = LoadLog::at(&path);
        log.degraded("chart", "metric series `hrv` is missing");
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();
        log.fetch_ok("member", 3);

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].source, "member");
    }

    #[test]
    fn read_recent_keeps_tail() {
        let path = temp_log("recent");
        let log = LoadLog::at(&path);
        for source in ["member", "stats", "health_metrics", "timeline"] {
            log.fetch_ok(source, 1);
        }
        let recent = read_recent(&path, 2);
        let sources: Vec<&str> = recent.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, ["health_metrics", "timeline"]);
    }

    #[test]
    fn missing_file_reads_empty() {
        assert!(read_entries(&temp_log("missing")).is_empty());
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let log = LoadLog::disabled();
        assert!(log.path().is_none());
        log.fetch_ok("stats", 1);
    }
}
