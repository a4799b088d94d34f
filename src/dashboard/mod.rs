//! Dashboard session: fetch every data source, route each result to its
//! renderer, and keep the page usable whatever subset of sources fails.
//!
//! Each fetch sits inside its own failure boundary. Only an error from the
//! counter update escapes to [`Dashboard::initialize`], which answers it with
//! a full fallback render.

pub mod generation;

use std::time::Instant;

use anyhow::Result;

use crate::analytics::logger::{LoadLog, LoadLogEntry, LogOutcome};
use crate::api::{Backend, FetchError, source};
use crate::config::schema::VitalboardConfig;
use crate::model::{self, StatsSummary, TimelineEvent};
use crate::render::activity::ActivityFeed;
use crate::render::chart::{ChartRenderer, ChartState};
use crate::render::modal::{ModalController, ModalState};
use crate::render::profile::ProfileRenderer;
use crate::render::{Action, RenderTarget, Slot, counters};

use generation::GenerationOutcome;

/// How many timeline events the activity feed keeps.
pub const RECENT_ACTIVITY_LIMIT: usize = 4;

/// A dashboard only starts on a page that has at least one of these.
const MOUNT_SLOTS: [Slot; 3] = [Slot::HealthChart, Slot::RecentActivity, Slot::GenerateButton];

/// Whether `target` is a dashboard page at all.
pub fn should_mount(target: &dyn RenderTarget) -> bool {
    MOUNT_SLOTS.iter().any(|&slot| target.has(slot))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardOptions {
    pub member_id: u32,
    /// Shown in the hint when generation cannot reach the backend.
    pub ollama_url: String,
}

impl DashboardOptions {
    pub fn from_config(config: &VitalboardConfig) -> Self {
        Self {
            member_id: config.backend.member_id,
            ollama_url: config.generation.ollama_url.clone(),
        }
    }
}

/// What happened during one [`Dashboard::initialize`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Outcome of each backend fetch, in the order issued.
    pub fetches: Vec<(&'static str, LogOutcome)>,
    /// The page fell back to defaults after an unexpected failure.
    pub fallback: bool,
}

impl LoadReport {
    pub fn outcome(&self, source: &str) -> Option<LogOutcome> {
        self.fetches
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, outcome)| *outcome)
    }

    pub fn failures(&self) -> usize {
        self.fetches.iter().filter(|(_, o)| o.is_failure()).count()
    }
}

/// Per-session dashboard state.
///
/// One value per page load. It owns the chart handle, the events currently
/// listed in the activity feed and the modal state.
#[derive(Debug)]
pub struct Dashboard<B: Backend> {
    backend: B,
    options: DashboardOptions,
    log: LoadLog,
    chart: ChartRenderer,
    feed: ActivityFeed,
    profile: ProfileRenderer,
    modal: ModalController,
    events: Vec<TimelineEvent>,
    stats: StatsSummary,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: B, options: DashboardOptions, log: LoadLog) -> Self {
        Self {
            chart: ChartRenderer::new(log.clone()),
            feed: ActivityFeed::new(log.clone()),
            profile: ProfileRenderer::new(log.clone()),
            modal: ModalController::new(log.clone()),
            backend,
            options,
            log,
            events: Vec::new(),
            stats: StatsSummary::default(),
        }
    }

    pub fn from_config(backend: B, config: &VitalboardConfig) -> Self {
        Self::new(
            backend,
            DashboardOptions::from_config(config),
            LoadLog::from_config(&config.logging),
        )
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    pub fn stats(&self) -> &StatsSummary {
        &self.stats
    }

    /// Events behind the activity feed entries, oldest first.
    pub fn recent_events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn chart_state(&self) -> ChartState {
        self.chart.state()
    }

    pub fn modal_state(&self) -> ModalState {
        self.modal.state()
    }

    /// Load every section onto `target`.
    ///
    /// Returns `None` when `target` is not a dashboard page.
    pub fn initialize(&mut self, target: &mut dyn RenderTarget) -> Option<LoadReport> {
        if !should_mount(target) {
            return None;
        }

        let mut report = LoadReport::default();
        if let Err(err) = self.load(target, &mut report) {
            self.log.record(
                LoadLogEntry::new("dashboard", LogOutcome::Fallback).with_detail(format!("{err:#}")),
            );
            self.render_fallback(target);
            report.fallback = true;
        }
        Some(report)
    }

    /// Route a user interaction.
    pub fn dispatch(&mut self, target: &mut dyn RenderTarget, action: Action) {
        match action {
            Action::OpenActivity(index) => {
                if let Some(event) = self.events.get(index) {
                    self.modal.open(target, event);
                }
            }
            Action::CloseModal => self.modal.close(target),
            Action::GenerateConversations => {
                self.generate_conversations(target);
            }
        }
    }

    /// Run the generation trigger against this session's backend.
    pub fn generate_conversations(
        &self,
        target: &mut dyn RenderTarget,
    ) -> Option<GenerationOutcome> {
        generation::run(target, &self.backend, &self.options.ollama_url, &self.log)
    }

    fn load(&mut self, target: &mut dyn RenderTarget, report: &mut LoadReport) -> Result<()> {
        self.load_member(target, report);

        let stats = self.load_stats(report);
        counters::render(target, &stats)?;
        self.stats = stats;

        self.load_metrics(target, report);
        self.load_timeline(target, report);
        Ok(())
    }

    fn load_member(&mut self, target: &mut dyn RenderTarget, report: &mut LoadReport) {
        let id = self.options.member_id;
        if let Some(member) = self.fetch(source::MEMBER, report, |b| b.member(id)) {
            self.profile.render(target, &member);
        }
    }

    fn load_stats(&mut self, report: &mut LoadReport) -> StatsSummary {
        let defaults = StatsSummary::default();
        match self.fetch(source::STATS, report, |b| b.stats()) {
            Some(patch) => defaults.merge(&patch),
            None => defaults,
        }
    }

    fn load_metrics(&mut self, target: &mut dyn RenderTarget, report: &mut LoadReport) {
        match self.fetch(source::HEALTH_METRICS, report, |b| b.health_metrics()) {
            Some(metrics) => self.chart.render_series(target, metrics),
            None => self.chart.render_empty(target),
        }
    }

    fn load_timeline(&mut self, target: &mut dyn RenderTarget, report: &mut LoadReport) {
        match self.fetch(source::TIMELINE, report, |b| b.timeline()) {
            Some(events) => {
                self.events = model::recent_events(events, RECENT_ACTIVITY_LIMIT);
                self.feed.render(target, &self.events);
            }
            None => {
                self.events.clear();
                self.feed.render_empty(target);
            }
        }
    }

    /// Default counters, empty chart and empty feed.
    fn render_fallback(&mut self, target: &mut dyn RenderTarget) {
        self.stats = StatsSummary::default();
        if let Err(err) = counters::render(target, &self.stats) {
            self.log.degraded("counters", format!("{err:#}"));
        }
        self.chart.render_empty(target);
        self.events.clear();
        self.feed.render_empty(target);
    }

    /// Issue one backend call, timing and logging it.
    fn fetch<T>(
        &self,
        source: &'static str,
        report: &mut LoadReport,
        call: impl FnOnce(&B) -> Result<T, FetchError>,
    ) -> Option<T> {
        let started = Instant::now();
        let result = call(&self.backend);
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(value) => {
                self.log.fetch_ok(source, latency_ms);
                report.fetches.push((source, LogOutcome::Ok));
                Some(value)
            }
            Err(err) => {
                self.log.fetch_failed(source, &err, latency_ms);
                report.fetches.push((source, LogOutcome::from(&err)));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::page::Page;

    #[test]
    fn mount_guard_needs_a_dashboard_slot() {
        assert!(should_mount(&Page::template()));
        assert!(should_mount(&Page::with_slots(&[Slot::GenerateButton])));
        assert!(!should_mount(&Page::with_slots(&[
            Slot::TotalDays,
            Slot::ProfileName
        ])));
    }

    #[test]
    fn report_lookup_and_failure_count() {
        let report = LoadReport {
            fetches: vec![
                (source::MEMBER, LogOutcome::Transport),
                (source::STATS, LogOutcome::Ok),
            ],
            fallback: false,
        };
        assert_eq!(report.outcome(source::MEMBER), Some(LogOutcome::Transport));
        assert_eq!(report.outcome(source::TIMELINE), None);
        assert_eq!(report.failures(), 1);
    }
}
