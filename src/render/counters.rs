//! The four stat counters.

use anyhow::Result;

use super::{RenderTarget, Slot};
use crate::model::StatsSummary;

/// Write every counter into its slot.
///
/// Unlike the section renderers this propagates surface errors: a failed
/// counter update is what sends the dashboard into its full fallback render.
pub fn render(target: &mut dyn RenderTarget, stats: &StatsSummary) -> Result<()> {
    let counters = [
        (Slot::TotalDays, stats.days_in_program),
        (Slot::TotalEvents, stats.total_events),
        (Slot::Breakthroughs, stats.breakthroughs),
        (Slot::TeamMembers, stats.team_members),
    ];

    for (slot, value) in counters {
        target.set_text(slot, &value.to_string())?;
    }

    Ok(())
}
