//! View-models: pure transforms from wire records to display-ready shapes.
//!
//! Nothing here touches a render surface. Renderers take these values and
//! push them into slots.

use serde::Serialize;

use crate::dates::format_date;
use crate::model::{MemberProfile, MetricSeries, TimelineEvent};

/// Shown for any missing scalar detail.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Display fields for the member profile card.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub display_name: String,
    /// `occupation • location`
    pub subtitle: String,
    /// Labeled demographic fields, in display order.
    pub demographics: Vec<(String, String)>,
    pub goals: Option<Vec<String>>,
    pub conditions: Option<Vec<String>>,
}

pub fn profile_view(member: &MemberProfile) -> ProfileView {
    let display_name = member
        .preferred_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(member.name.as_str())
        .to_string();

    let occupation = or_na(member.occupation.as_deref());
    let location = or_na(member.location.as_deref());
    let age = member
        .age
        .map(|a| a.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    ProfileView {
        display_name,
        subtitle: format!("{occupation} • {location}"),
        demographics: vec![
            ("Age".to_string(), age),
            ("Gender".to_string(), or_na(member.gender.as_deref())),
            ("Location".to_string(), location),
        ],
        goals: member.health_goals.clone(),
        conditions: member.chronic_conditions.clone(),
    }
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

/// Which side of the plot an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

/// One independent y-axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub id: &'static str,
    pub position: AxisPosition,
    pub title: &'static str,
    /// Whether this axis draws gridlines across the chart area.
    pub grid: bool,
}

/// One plotted line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<f64>,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub tension: f64,
    pub axis: &'static str,
}

/// A dual-axis line chart, ready to mount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub axes: Vec<Axis>,
}

impl ChartDataset {
    pub fn axis(&self, id: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.id == id)
    }
}

/// Build the HRV / Recovery Score chart.
///
/// Labels come from the HRV series; the recovery series is assumed to share
/// its dates position by position (see [`crate::model::HealthMetrics::into_series`]).
pub fn chart_dataset(series: &MetricSeries) -> ChartDataset {
    ChartDataset {
        labels: series.hrv.iter().map(|p| format_date(&p.date)).collect(),
        datasets: vec![
            Dataset {
                label: "HRV",
                data: series.hrv.iter().map(|p| p.value).collect(),
                border_color: "#1FB8CD",
                background_color: "rgba(31, 184, 205, 0.1)",
                tension: 0.4,
                axis: "y",
            },
            Dataset {
                label: "Recovery Score",
                data: series.recovery.iter().map(|p| p.value).collect(),
                border_color: "#FFC185",
                background_color: "rgba(255, 193, 133, 0.1)",
                tension: 0.4,
                axis: "y1",
            },
        ],
        axes: vec![
            Axis {
                id: "y",
                position: AxisPosition::Left,
                title: "HRV (ms)",
                grid: true,
            },
            Axis {
                id: "y1",
                position: AxisPosition::Right,
                title: "Recovery Score (%)",
                grid: false,
            },
        ],
    }
}

// ---------------------------------------------------------------------------
// Activity feed and detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityItem {
    pub title: String,
    pub date: String,
}

pub fn activity_item(event: &TimelineEvent) -> ActivityItem {
    ActivityItem {
        title: event.title.clone(),
        date: format_date(&event.date),
    }
}

/// Everything the detail modal shows for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetail {
    pub title: String,
    pub date: String,
    pub category: String,
    pub description: String,
    pub outcome: String,
    pub team_members: String,
    pub response_time: String,
    pub time_to_resolution: String,
    /// `None` drops the section entirely.
    pub friction_points: Option<String>,
}

pub fn event_detail(event: &TimelineEvent) -> EventDetail {
    EventDetail {
        title: event.title.clone(),
        date: format_date(&event.date),
        category: non_blank(event.category.as_deref())
            .map(capitalize_first)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        description: non_blank(event.description.as_deref())
            .unwrap_or("No description available")
            .to_string(),
        outcome: non_blank(event.outcome.as_deref())
            .unwrap_or("No outcome recorded")
            .to_string(),
        team_members: event
            .team_members
            .as_deref()
            .map_or_else(|| "None".to_string(), |members| members.join(", ")),
        response_time: or_na(event.response_time.as_deref()),
        time_to_resolution: or_na(event.time_to_resolution.as_deref()),
        friction_points: non_blank(event.friction_points.as_deref()).map(str::to_string),
    }
}

/// Upper-case the first character, leave the rest as-is.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn or_na(value: Option<&str>) -> String {
    non_blank(value).unwrap_or(NOT_AVAILABLE).to_string()
}
