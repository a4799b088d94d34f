//! Member profile card.

use anyhow::Result;

use super::{Entry, List, ListStyle, RenderTarget, Slot};
use crate::analytics::logger::LoadLog;
use crate::model::MemberProfile;
use crate::view;

#[derive(Debug)]
pub struct ProfileRenderer {
    log: LoadLog,
}

impl ProfileRenderer {
    pub fn new(log: LoadLog) -> Self {
        Self { log }
    }

    /// Fill the card. Goals and condition tags are only written when the
    /// profile carries them; otherwise those regions keep what they had.
    pub fn render(&self, target: &mut dyn RenderTarget, member: &MemberProfile) {
        if let Err(err) = write_card(target, member) {
            self.log.degraded("profile", format!("{err:#}"));
        }
    }
}

fn write_card(target: &mut dyn RenderTarget, member: &MemberProfile) -> Result<()> {
    let profile = view::profile_view(member);

    target.set_text(Slot::ProfileName, &profile.display_name)?;
    target.set_text(Slot::ProfileSubtitle, &profile.subtitle)?;

    let demographics = profile
        .demographics
        .into_iter()
        .map(|(label, value)| Entry::field(label, value))
        .collect();
    target.set_list(Slot::ProfileStats, List::new(ListStyle::Fields, demographics))?;

    if let Some(goals) = &profile.goals {
        target.set_list(Slot::HealthGoals, List::of_text(ListStyle::Ordered, goals))?;
    }
    if let Some(conditions) = &profile.conditions {
        target.set_list(Slot::ConditionTags, List::of_text(ListStyle::Tags, conditions))?;
    }

    Ok(())
}
