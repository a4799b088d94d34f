//! Render surface abstraction and the per-section renderers.
//!
//! The dashboard never touches a concrete page. It writes into fixed
//! [`Slot`]s through the [`RenderTarget`] capability trait, so the same
//! renderers drive the in-memory [`page::Page`] used by tests, the terminal
//! view and the HTML view.
//!
//! Every slot is optional. Writing to a slot the target does not have is a
//! successful no-op, which is what lets partial page templates work.

pub mod activity;
pub mod chart;
pub mod counters;
pub mod modal;
pub mod page;
pub mod profile;

use anyhow::Result;
use serde::{Serialize, Serializer};

use crate::view::ChartDataset;

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// A fixed region of the dashboard template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    TotalDays,
    TotalEvents,
    Breakthroughs,
    TeamMembers,
    HealthChart,
    RecentActivity,
    ModalTitle,
    ModalBody,
    Modal,
    ModalOverlay,
    ModalClose,
    GenerateButton,
    GenerationStatus,
    ProfileName,
    ProfileSubtitle,
    ProfileStats,
    HealthGoals,
    ConditionTags,
}

impl Slot {
    pub const ALL: [Slot; 18] = [
        Slot::TotalDays,
        Slot::TotalEvents,
        Slot::Breakthroughs,
        Slot::TeamMembers,
        Slot::HealthChart,
        Slot::RecentActivity,
        Slot::ModalTitle,
        Slot::ModalBody,
        Slot::Modal,
        Slot::ModalOverlay,
        Slot::ModalClose,
        Slot::GenerateButton,
        Slot::GenerationStatus,
        Slot::ProfileName,
        Slot::ProfileSubtitle,
        Slot::ProfileStats,
        Slot::HealthGoals,
        Slot::ConditionTags,
    ];

    /// Element identifier used by the page template.
    pub fn id(self) -> &'static str {
        match self {
            Self::TotalDays => "totalDays",
            Self::TotalEvents => "totalEvents",
            Self::Breakthroughs => "breakthroughs",
            Self::TeamMembers => "teamMembers",
            Self::HealthChart => "healthMetricsChart",
            Self::RecentActivity => "recentActivity",
            Self::ModalTitle => "modalTitle",
            Self::ModalBody => "modalBody",
            Self::Modal => "episodeModal",
            Self::ModalOverlay => "modalOverlay",
            Self::ModalClose => "modalClose",
            Self::GenerateButton => "generateConversationsBtn",
            Self::GenerationStatus => "generationStatus",
            Self::ProfileName => "profileName",
            Self::ProfileSubtitle => "memberSubtitle",
            Self::ProfileStats => "memberStats",
            Self::HealthGoals => "healthGoals",
            Self::ConditionTags => "conditionTags",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// User interaction bound to an entry or control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Action {
    /// Open the detail modal for the n-th entry of the activity feed.
    OpenActivity(usize),
    CloseModal,
    GenerateConversations,
}

/// Visual weight of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// How a list slot lays out its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Ordered,
    Unordered,
    Tags,
    /// `label: text` pairs.
    Fields,
    Activity,
    Status,
}

/// One entry of a list slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    /// Put the text on its own line under the label.
    pub block: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl Entry {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            label: None,
            text: text.into(),
            secondary: None,
            block: false,
            tone: None,
            action: None,
        }
    }

    pub fn field(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::text(text)
        }
    }

    pub fn block_field(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            block: true,
            ..Self::field(label, text)
        }
    }

    pub fn status(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone: Some(tone),
            ..Self::text(text)
        }
    }

    pub fn activity(title: impl Into<String>, date: impl Into<String>, action: Action) -> Self {
        Self {
            secondary: Some(date.into()),
            action: Some(action),
            ..Self::text(title)
        }
    }
}

/// Complete replacement content for a list slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub style: ListStyle,
    pub entries: Vec<Entry>,
}

impl List {
    pub fn new(style: ListStyle, entries: Vec<Entry>) -> Self {
        Self { style, entries }
    }

    pub fn of_text(style: ListStyle, items: &[String]) -> Self {
        Self::new(style, items.iter().map(Entry::text).collect())
    }
}

// ---------------------------------------------------------------------------
// Drawing surface
// ---------------------------------------------------------------------------

/// Identifies a chart instance mounted on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChartHandle(pub u64);

/// A static "no data" picture painted straight onto the chart surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placeholder {
    pub width: u32,
    pub height: u32,
    pub background: &'static str,
    pub text_color: &'static str,
    pub font: &'static str,
    pub message: &'static str,
    pub text_x: u32,
    pub text_y: u32,
}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// The operations renderers need from a page.
///
/// Implementations must treat every write to a slot they do not have as an
/// `Ok(())` no-op. Errors are reserved for a surface that exists but cannot
/// be updated.
pub trait RenderTarget {
    fn has(&self, slot: Slot) -> bool;

    /// Replace the slot's content with plain text.
    fn set_text(&mut self, slot: Slot, text: &str) -> Result<()>;

    /// Replace the slot's content with a list. Never merges.
    fn set_list(&mut self, slot: Slot, list: List) -> Result<()>;

    fn show(&mut self, slot: Slot) -> Result<()>;

    fn hide(&mut self, slot: Slot) -> Result<()>;

    fn set_enabled(&mut self, slot: Slot, enabled: bool) -> Result<()>;

    /// Create a chart instance bound to `slot`.
    fn mount_chart(&mut self, slot: Slot, chart: &ChartDataset) -> Result<ChartHandle>;

    /// Tear down a chart instance previously returned by `mount_chart`.
    fn destroy_chart(&mut self, handle: ChartHandle) -> Result<()>;

    fn paint_placeholder(&mut self, slot: Slot, placeholder: &Placeholder) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_ids_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(Slot::from_id(slot.id()), Some(slot));
        }
        assert_eq!(Slot::from_id("nope"), None);
    }

    #[test]
    fn slot_serializes_as_id() {
        let json = serde_json::to_string(&Slot::HealthChart).unwrap();
        assert_eq!(json, "\"healthMetricsChart\"");
    }

    #[test]
    fn entry_constructors_set_expected_fields() {
        let e = Entry::block_field("Outcome", "Improved");
        assert_eq!(e.label.as_deref(), Some("Outcome"));
        assert!(e.block);

        let a = Entry::activity("Visit", "07/03/24", Action::OpenActivity(2));
        assert_eq!(a.secondary.as_deref(), Some("07/03/24"));
        assert_eq!(a.action, Some(Action::OpenActivity(2)));
    }
}
