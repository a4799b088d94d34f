//! Recent-activity feed.

use super::{Action, Entry, List, ListStyle, RenderTarget, Slot};
use crate::analytics::logger::LoadLog;
use crate::model::TimelineEvent;
use crate::view;

pub const EMPTY_MESSAGE: &str = "No recent activity available";

/// Writes the feed into [`Slot::RecentActivity`]. Holds no state between
/// renders; the dashboard keeps the events the entries point at.
#[derive(Debug)]
pub struct ActivityFeed {
    log: LoadLog,
}

impl ActivityFeed {
    pub fn new(log: LoadLog) -> Self {
        Self { log }
    }

    /// Replace the feed with one entry per event, in the order given.
    ///
    /// Entry `i` carries [`Action::OpenActivity`]`(i)`.
    pub fn render(&self, target: &mut dyn RenderTarget, events: &[TimelineEvent]) {
        if events.is_empty() {
            self.render_empty(target);
            return;
        }

        let entries = events
            .iter()
            .enumerate()
            .map(|(i, event)| {
                let item = view::activity_item(event);
                Entry::activity(item.title, item.date, Action::OpenActivity(i))
            })
            .collect();

        if let Err(err) = target.set_list(Slot::RecentActivity, List::new(ListStyle::Activity, entries)) {
            self.log.degraded("activity", format!("{err:#}"));
        }
    }

    pub fn render_empty(&self, target: &mut dyn RenderTarget) {
        if let Err(err) = target.set_text(Slot::RecentActivity, EMPTY_MESSAGE) {
            self.log.degraded("activity", format!("{err:#}"));
        }
    }
}
