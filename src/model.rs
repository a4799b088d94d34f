//! Wire records returned by the backend API.
//!
//! Every optional field tolerates both a missing key and an explicit `null`.
//! Keys the dashboard does not use (`id`, `member_id`, `wearables`,
//! `total_conversations`, ...) are ignored on decode.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Member profile
// ---------------------------------------------------------------------------

/// `GET /api/member/{id}`: one member's identity and health context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub name: String,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    /// Ordered goals. `None` means the backend did not send the key.
    #[serde(default)]
    pub health_goals: Option<Vec<String>>,
    #[serde(default)]
    pub chronic_conditions: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// The four dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub days_in_program: u64,
    pub total_events: u64,
    pub breakthroughs: u64,
    pub team_members: u64,
}

impl Default for StatsSummary {
    fn default() -> Self {
        Self {
            days_in_program: 240,
            total_events: 0,
            breakthroughs: 2,
            team_members: 6,
        }
    }
}

impl StatsSummary {
    /// Overlay the keys present in `patch`, keeping every other counter.
    pub fn merge(mut self, patch: &StatsPatch) -> Self {
        if let Some(v) = patch.days_in_program {
            self.days_in_program = v;
        }
        if let Some(v) = patch.total_events {
            self.total_events = v;
        }
        if let Some(v) = patch.breakthroughs {
            self.breakthroughs = v;
        }
        if let Some(v) = patch.team_members {
            self.team_members = v;
        }
        self
    }
}

/// `GET /api/stats`: any subset of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsPatch {
    #[serde(default)]
    pub days_in_program: Option<u64>,
    #[serde(default)]
    pub total_events: Option<u64>,
    #[serde(default)]
    pub breakthroughs: Option<u64>,
    #[serde(default)]
    pub team_members: Option<u64>,
}

// ---------------------------------------------------------------------------
// Health metrics
// ---------------------------------------------------------------------------

/// One sample of a metric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: String,
    pub value: f64,
}

/// `GET /api/health-metrics`: series grouped by metric type.
///
/// The backend only includes a key when it has samples of that type, so both
/// series are optional here. Other metric types are dropped on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    #[serde(default)]
    pub hrv: Option<Vec<MetricPoint>>,
    #[serde(default)]
    pub recovery_score: Option<Vec<MetricPoint>>,
}

/// Why a metrics payload cannot be charted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("metric series `{0}` is missing")]
    Missing(&'static str),
    #[error("metric series contain no points")]
    NoPoints,
    #[error("metric series are misaligned (hrv={hrv}, recovery_score={recovery})")]
    Misaligned { hrv: usize, recovery: usize },
}

/// Validated pair of co-indexed series ready for charting.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub hrv: Vec<MetricPoint>,
    pub recovery: Vec<MetricPoint>,
}

impl HealthMetrics {
    /// Validate the payload into chartable series.
    ///
    /// The series are paired by position, not by date, so unequal lengths
    /// are rejected rather than plotted against the wrong labels.
    pub fn into_series(self) -> Result<MetricSeries, SeriesError> {
        let hrv = self.hrv.ok_or(SeriesError::Missing("hrv"))?;
        let recovery = self
            .recovery_score
            .ok_or(SeriesError::Missing("recovery_score"))?;

        if hrv.len() != recovery.len() {
            return Err(SeriesError::Misaligned {
                hrv: hrv.len(),
                recovery: recovery.len(),
            });
        }
        if hrv.is_empty() {
            return Err(SeriesError::NoPoints);
        }

        Ok(MetricSeries { hrv, recovery })
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// `GET /api/timeline` element: one care event, oldest first in the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub team_members: Option<Vec<String>>,
    #[serde(default)]
    pub response_time: Option<String>,
    #[serde(default)]
    pub time_to_resolution: Option<String>,
    #[serde(default)]
    pub friction_points: Option<String>,
}

/// Keep only the newest `limit` events, preserving their order.
pub fn recent_events(mut events: Vec<TimelineEvent>, limit: usize) -> Vec<TimelineEvent> {
    let skip = events.len().saturating_sub(limit);
    events.drain(..skip);
    events
}

// ---------------------------------------------------------------------------
// Conversation generation
// ---------------------------------------------------------------------------

/// Outcome reported by `POST /api/generate-conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "GenerationPayload")]
pub enum GenerationResult {
    Created { total_conversations: u64 },
    Failed { error: String },
}

/// Wire shape: `{success?, total_conversations?, error?, message?}`.
///
/// Error replies from the backend may carry only `{error}`; a missing
/// `success` reads as a refusal.
#[derive(Deserialize)]
struct GenerationPayload {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    total_conversations: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

impl From<GenerationPayload> for GenerationResult {
    fn from(payload: GenerationPayload) -> Self {
        if payload.success {
            Self::Created {
                total_conversations: payload.total_conversations.unwrap_or(0),
            }
        } else {
            Self::Failed {
                error: payload
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "unknown error".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, value: f64) -> MetricPoint {
        MetricPoint {
            date: date.to_string(),
            value,
        }
    }

    #[test]
    fn stats_merge_overrides_present_keys_only() {
        let patch: StatsPatch = serde_json::from_str(r#"{"total_events": 12}"#).unwrap();
        let merged = StatsSummary::default().merge(&patch);
        assert_eq!(
            merged,
            StatsSummary {
                days_in_program: 240,
                total_events: 12,
                breakthroughs: 2,
                team_members: 6,
            }
        );
    }

    #[test]
    fn stats_patch_ignores_unknown_and_null_keys() {
        let patch: StatsPatch = serde_json::from_str(
            r#"{"total_conversations": 310, "breakthroughs": null, "team_members": 4}"#,
        )
        .unwrap();
        let merged = StatsSummary::default().merge(&patch);
        assert_eq!(merged.breakthroughs, 2);
        assert_eq!(merged.team_members, 4);
    }

    #[test]
    fn stats_patch_keeps_explicit_zero() {
        let patch: StatsPatch = serde_json::from_str(r#"{"days_in_program": 0}"#).unwrap();
        assert_eq!(StatsSummary::default().merge(&patch).days_in_program, 0);
    }

    #[test]
    fn series_missing_either_side_is_rejected() {
        let only_hrv = HealthMetrics {
            hrv: Some(vec![point("2024-03-07", 41.0)]),
            recovery_score: None,
        };
        assert_eq!(
            only_hrv.into_series(),
            Err(SeriesError::Missing("recovery_score"))
        );
        assert_eq!(
            HealthMetrics::default().into_series(),
            Err(SeriesError::Missing("hrv"))
        );
    }

    #[test]
    fn series_length_mismatch_is_rejected() {
        let metrics = HealthMetrics {
            hrv: Some(vec![point("2024-03-07", 41.0), point("2024-03-08", 44.0)]),
            recovery_score: Some(vec![point("2024-03-07", 70.0)]),
        };
        assert_eq!(
            metrics.into_series(),
            Err(SeriesError::Misaligned { hrv: 2, recovery: 1 })
        );
    }

    #[test]
    fn metrics_decode_drops_other_types() {
        let metrics: HealthMetrics = serde_json::from_str(
            r#"{"hrv": [{"date": "2024-03-07", "value": 41.5}],
                "recovery_score": [{"date": "2024-03-07", "value": 72}],
                "resting_heart_rate": [{"date": "2024-03-07", "value": 58}]}"#,
        )
        .unwrap();
        let series = metrics.into_series().unwrap();
        assert_eq!(series.hrv[0].value, 41.5);
        assert_eq!(series.recovery[0].value, 72.0);
    }

    #[test]
    fn recent_events_keeps_tail_in_order() {
        let events: Vec<TimelineEvent> = (1..=6)
            .map(|i| TimelineEvent {
                title: format!("event {i}"),
                ..Default::default()
            })
            .collect();
        let titles: Vec<String> = recent_events(events, 4)
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["event 3", "event 4", "event 5", "event 6"]);
    }

    #[test]
    fn recent_events_short_list_is_untouched() {
        let events = vec![TimelineEvent::default(); 2];
        assert_eq!(recent_events(events, 4).len(), 2);
    }

    #[test]
    fn generation_result_decodes_both_shapes() {
        let ok: GenerationResult =
            serde_json::from_str(r#"{"success": true, "message": "Generated 5 conversations", "total_conversations": 5}"#)
                .unwrap();
        assert_eq!(
            ok,
            GenerationResult::Created {
                total_conversations: 5
            }
        );

        let failed: GenerationResult =
            serde_json::from_str(r#"{"success": false, "error": "model not found"}"#).unwrap();
        assert_eq!(
            failed,
            GenerationResult::Failed {
                error: "model not found".to_string()
            }
        );
    }

    #[test]
    fn generation_result_without_success_flag_is_a_refusal() {
        let bare: GenerationResult = serde_json::from_str(r#"{"error": "x"}"#).unwrap();
        assert_eq!(
            bare,
            GenerationResult::Failed {
                error: "x".to_string()
            }
        );

        let empty: GenerationResult = serde_json::from_str("{}").unwrap();
        assert_eq!(
            empty,
            GenerationResult::Failed {
                error: "unknown error".to_string()
            }
        );
    }
}
