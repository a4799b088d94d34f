//! In-memory page: the concrete [`RenderTarget`] behind every view.
//!
//! A [`Page`] is seeded from the dashboard template (counters, profile card,
//! chart surface, activity feed, modal, generation controls) and records
//! whatever the renderers write. The terminal and HTML views read it back.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use serde::Serialize;

use super::{ChartHandle, List, ListStyle, Placeholder, RenderTarget, Slot};
use crate::view::ChartDataset;

/// Label the generation button carries when idle.
pub const GENERATE_LABEL: &str = "Generate Conversations";

/// What a slot currently displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Empty,
    Text { text: String },
    List { list: List },
    Chart { handle: ChartHandle, chart: ChartDataset },
    Placeholder { placeholder: Placeholder },
}

/// One slot's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub content: Content,
    pub visible: bool,
    pub enabled: bool,
}

impl Region {
    fn new(content: Content) -> Self {
        Self {
            content,
            visible: true,
            enabled: true,
        }
    }

    fn text(text: &str) -> Self {
        Self::new(Content::Text {
            text: text.to_string(),
        })
    }
}

/// A dashboard page held in memory.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    regions: BTreeMap<Slot, Region>,
    #[serde(skip)]
    next_handle: u64,
}

impl Page {
    /// The full dashboard template with its static defaults.
    pub fn template() -> Self {
        Self::with_slots(&Slot::ALL)
    }

    /// A partial template carrying only `slots`.
    pub fn with_slots(slots: &[Slot]) -> Self {
        let regions = slots
            .iter()
            .map(|&slot| (slot, template_region(slot)))
            .collect();
        Self {
            regions,
            next_handle: 1,
        }
    }

    pub fn region(&self, slot: Slot) -> Option<&Region> {
        self.regions.get(&slot)
    }

    pub fn regions(&self) -> impl Iterator<Item = (Slot, &Region)> {
        self.regions.iter().map(|(slot, region)| (*slot, region))
    }

    pub fn text(&self, slot: Slot) -> Option<&str> {
        match &self.region(slot)?.content {
            Content::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn list(&self, slot: Slot) -> Option<&List> {
        match &self.region(slot)?.content {
            Content::List { list } => Some(list),
            _ => None,
        }
    }

    pub fn chart(&self, slot: Slot) -> Option<&ChartDataset> {
        match &self.region(slot)?.content {
            Content::Chart { chart, .. } => Some(chart),
            _ => None,
        }
    }

    pub fn placeholder(&self, slot: Slot) -> Option<&Placeholder> {
        match &self.region(slot)?.content {
            Content::Placeholder { placeholder } => Some(placeholder),
            _ => None,
        }
    }

    pub fn is_visible(&self, slot: Slot) -> bool {
        self.region(slot).is_some_and(|r| r.visible)
    }

    pub fn is_enabled(&self, slot: Slot) -> bool {
        self.region(slot).is_some_and(|r| r.enabled)
    }

    /// Number of chart instances currently mounted.
    pub fn live_charts(&self) -> usize {
        self.regions
            .values()
            .filter(|r| matches!(r.content, Content::Chart { .. }))
            .count()
    }

    fn region_mut(&mut self, slot: Slot) -> Option<&mut Region> {
        self.regions.get_mut(&slot)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::template()
    }
}

/// Static content a slot shows before any data arrives.
fn template_region(slot: Slot) -> Region {
    match slot {
        Slot::TotalDays | Slot::TotalEvents | Slot::Breakthroughs | Slot::TeamMembers => {
            Region::text("-")
        }
        Slot::ProfileName => Region::text("Member"),
        Slot::ProfileSubtitle => Region::text("Health program member"),
        Slot::ProfileStats => Region::new(Content::List {
            list: List::new(ListStyle::Fields, Vec::new()),
        }),
        Slot::HealthGoals => Region::new(Content::List {
            list: List::new(ListStyle::Ordered, Vec::new()),
        }),
        Slot::ConditionTags => Region::new(Content::List {
            list: List::new(ListStyle::Tags, Vec::new()),
        }),
        Slot::ModalTitle => Region::text(""),
        Slot::Modal => Region {
            visible: false,
            ..Region::new(Content::Empty)
        },
        Slot::ModalClose => Region::text("×"),
        Slot::GenerateButton => Region::text(GENERATE_LABEL),
        Slot::HealthChart
        | Slot::RecentActivity
        | Slot::ModalBody
        | Slot::ModalOverlay
        | Slot::GenerationStatus => Region::new(Content::Empty),
    }
}

impl RenderTarget for Page {
    fn has(&self, slot: Slot) -> bool {
        self.regions.contains_key(&slot)
    }

    fn set_text(&mut self, slot: Slot, text: &str) -> Result<()> {
        if let Some(region) = self.region_mut(slot) {
            region.content = Content::Text {
                text: text.to_string(),
            };
        }
        Ok(())
    }

    fn set_list(&mut self, slot: Slot, list: List) -> Result<()> {
        if let Some(region) = self.region_mut(slot) {
            region.content = Content::List { list };
        }
        Ok(())
    }

    fn show(&mut self, slot: Slot) -> Result<()> {
        if let Some(region) = self.region_mut(slot) {
            region.visible = true;
        }
        Ok(())
    }

    fn hide(&mut self, slot: Slot) -> Result<()> {
        if let Some(region) = self.region_mut(slot) {
            region.visible = false;
        }
        Ok(())
    }

    fn set_enabled(&mut self, slot: Slot, enabled: bool) -> Result<()> {
        if let Some(region) = self.region_mut(slot) {
            region.enabled = enabled;
        }
        Ok(())
    }

    fn mount_chart(&mut self, slot: Slot, chart: &ChartDataset) -> Result<ChartHandle> {
        let handle = ChartHandle(self.next_handle);
        let Some(region) = self.regions.get_mut(&slot) else {
            bail!("no `{}` surface to mount a chart on", slot.id());
        };
        if let Content::Chart { handle: live, .. } = &region.content {
            bail!("`{}` is still bound to chart {}", slot.id(), live.0);
        }
        region.content = Content::Chart {
            handle,
            chart: chart.clone(),
        };
        self.next_handle += 1;
        Ok(handle)
    }

    fn destroy_chart(&mut self, handle: ChartHandle) -> Result<()> {
        for region in self.regions.values_mut() {
            if matches!(region.content, Content::Chart { handle: h, .. } if h == handle) {
                region.content = Content::Empty;
                return Ok(());
            }
        }
        bail!("chart {} is not mounted", handle.0)
    }

    fn paint_placeholder(&mut self, slot: Slot, placeholder: &Placeholder) -> Result<()> {
        if let Some(region) = self.region_mut(slot) {
            region.content = Content::Placeholder {
                placeholder: placeholder.clone(),
            };
        }
        Ok(())
    }
}
