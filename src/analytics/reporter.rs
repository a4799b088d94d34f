//! Load-log reporter: per-source reliability summary for `vitalboard log`.

use std::collections::BTreeMap;

use crate::analytics::logger::{LoadLogEntry, LogOutcome};

/// Aggregated outcomes for one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSummary {
    pub source: String,
    pub total: usize,
    pub failures: usize,
    /// Mean latency over entries that recorded one.
    pub avg_latency_ms: Option<u64>,
    /// Detail of the most recent failure.
    pub last_failure: Option<String>,
}

impl SourceSummary {
    /// Percentage of entries that succeeded, 0.0 if there are none.
    pub fn success_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            ((self.total - self.failures) as f64 / self.total as f64) * 100.0
        }
    }
}

/// Group entries by source, sorted by source name.
pub fn summarize(entries: &[LoadLogEntry]) -> Vec<SourceSummary> {
    let mut by_source: BTreeMap<&str, (SourceSummary, u64, u64)> = BTreeMap::new();

    for entry in entries {
        let (summary, latency_sum, latency_count) = by_source
            .entry(entry.source.as_str())
            .or_insert_with(|| {
                (
                    SourceSummary {
                        source: entry.source.clone(),
                        ..Default::default()
                    },
                    0,
                    0,
                )
            });

        summary.total += 1;
        if entry.outcome.is_failure() {
            summary.failures += 1;
            summary.last_failure = Some(
                entry
                    .detail
                    .clone()
                    .unwrap_or_else(|| format!("{:?}", entry.outcome)),
            );
        }
        if let Some(ms) = entry.latency_ms {
            *latency_sum += ms;
            *latency_count += 1;
        }
    }

    by_source
        .into_values()
        .map(|(mut summary, sum, count)| {
            if count > 0 {
                summary.avg_latency_ms = Some(sum / count);
            }
            summary
        })
        .collect()
}

/// Number of full fallback renders in `entries`.
pub fn fallback_count(entries: &[LoadLogEntry]) -> usize {
    entries
        .iter()
        .filter(|e| e.outcome == LogOutcome::Fallback)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, outcome: LogOutcome, latency: Option<u64>) -> LoadLogEntry {
        LoadLogEntry {
            timestamp: "2024-03-07T09:00:00Z".to_string(),
            source: source.to_string(),
            outcome,
            detail: None,
            latency_ms: latency,
        }
    }

    #[test]
    fn summarize_groups_and_counts() {
        let entries = vec![
            entry("stats", LogOutcome::Ok, Some(10)),
            entry("stats", LogOutcome::Transport, Some(30)),
            entry("timeline", LogOutcome::Ok, None),
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.len(), 2);

        let stats = &summary[0];
        assert_eq!(stats.source, "stats");
        assert_eq!(stats.total, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.avg_latency_ms, Some(20));
        assert_eq!(stats.last_failure.as_deref(), Some("Transport"));
        assert!((stats.success_pct() - 50.0).abs() < f64::EPSILON);

        assert_eq!(summary[1].avg_latency_ms, None);
    }

    #[test]
    fn fallback_count_only_counts_fallbacks() {
        let entries = vec![
            entry("dashboard", LogOutcome::Fallback, None),
            entry("chart", LogOutcome::Degraded, None),
        ];
        assert_eq!(fallback_count(&entries), 1);
    }

    #[test]
    fn empty_summary_pct_is_zero() {
        assert_eq!(SourceSummary::default().success_pct(), 0.0);
    }
}
