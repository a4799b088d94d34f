//! Event detail modal.

use anyhow::Result;

use super::{Entry, List, ListStyle, RenderTarget, Slot};
use crate::analytics::logger::LoadLog;
use crate::model::TimelineEvent;
use crate::view;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open,
}

#[derive(Debug)]
pub struct ModalController {
    state: ModalState,
    log: LoadLog,
}

impl ModalController {
    pub fn new(log: LoadLog) -> Self {
        Self {
            state: ModalState::Closed,
            log,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    /// Fill the detail fields for `event` and reveal the modal.
    ///
    /// Does nothing unless the title, body and modal slots all exist.
    pub fn open(&mut self, target: &mut dyn RenderTarget, event: &TimelineEvent) {
        if ![Slot::ModalTitle, Slot::ModalBody, Slot::Modal]
            .into_iter()
            .all(|slot| target.has(slot))
        {
            return;
        }

        match populate(target, event) {
            Ok(()) => self.state = ModalState::Open,
            Err(err) => self.log.degraded("modal", format!("{err:#}")),
        }
    }

    /// Hide the modal. Safe to call when already closed.
    pub fn close(&mut self, target: &mut dyn RenderTarget) {
        if let Err(err) = target.hide(Slot::Modal) {
            self.log.degraded("modal", format!("{err:#}"));
        }
        self.state = ModalState::Closed;
    }
}

fn populate(target: &mut dyn RenderTarget, event: &TimelineEvent) -> Result<()> {
    let detail = view::event_detail(event);

    let mut fields = vec![
        Entry::field("Date", detail.date),
        Entry::field("Category", detail.category),
        Entry::block_field("Description", detail.description),
        Entry::block_field("Outcome", detail.outcome),
        Entry::field("Team Members", detail.team_members),
        Entry::field("Response Time", detail.response_time),
        Entry::field("Time to Resolution", detail.time_to_resolution),
    ];
    if let Some(friction) = detail.friction_points {
        fields.push(Entry::block_field("Friction Points", friction));
    }

    target.set_text(Slot::ModalTitle, &detail.title)?;
    target.set_list(Slot::ModalBody, List::new(ListStyle::Fields, fields))?;
    target.show(Slot::Modal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::page::Page;

    fn event() -> TimelineEvent {
        TimelineEvent {
            title: "Quarterly lab panel".to_string(),
            date: "2024-03-07".to_string(),
            category: Some("diagnostics".to_string()),
            team_members: Some(vec!["Dr. Warren".to_string(), "Ruby".to_string()]),
            ..Default::default()
        }
    }

    fn labels(page: &Page) -> Vec<String> {
        page.list(Slot::ModalBody)
            .unwrap()
            .entries
            .iter()
            .filter_map(|e| e.label.clone())
            .collect()
    }

    #[test]
    fn open_fills_fields_and_reveals() {
        let mut page = Page::template();
        let mut modal = ModalController::new(LoadLog::disabled());
        modal.open(&mut page, &event());

        assert_eq!(modal.state(), ModalState::Open);
        assert!(page.is_visible(Slot::Modal));
        assert_eq!(page.text(Slot::ModalTitle), Some("Quarterly lab panel"));

        let body = page.list(Slot::ModalBody).unwrap();
        assert_eq!(body.entries[0].text, "07/03/24");
        assert_eq!(body.entries[1].text, "Diagnostics");
        assert_eq!(body.entries[2].text, "No description available");
        assert!(body.entries[2].block);
        assert_eq!(body.entries[4].text, "Dr. Warren, Ruby");
        assert!(!labels(&page).contains(&"Friction Points".to_string()));
    }

    #[test]
    fn friction_points_appear_when_present() {
        let mut page = Page::template();
        let mut modal = ModalController::new(LoadLog::disabled());
        let with_friction = TimelineEvent {
            friction_points: Some("Travel clashed with the appointment".to_string()),
            ..event()
        };
        modal.open(&mut page, &with_friction);
        assert_eq!(labels(&page).last().map(String::as_str), Some("Friction Points"));
    }

    #[test]
    fn open_then_close_hides_and_close_is_idempotent() {
        let mut page = Page::template();
        let mut modal = ModalController::new(LoadLog::disabled());
        modal.open(&mut page, &event());
        modal.close(&mut page);
        assert!(!page.is_visible(Slot::Modal));
        assert_eq!(modal.state(), ModalState::Closed);

        modal.close(&mut page);
        assert!(!page.is_visible(Slot::Modal));
        assert_eq!(modal.state(), ModalState::Closed);
    }

    #[test]
    fn missing_slots_keep_modal_closed() {
        let mut page = Page::with_slots(&[Slot::ModalTitle, Slot::Modal]);
        let mut modal = ModalController::new(LoadLog::disabled());
        modal.open(&mut page, &event());
        assert_eq!(modal.state(), ModalState::Closed);
        assert_eq!(page.text(Slot::ModalTitle), Some(""));
    }
}
