//! Health-metrics chart: the only renderer that owns a resource.
//!
//! The chart instance mounted on the surface is tracked by handle and torn
//! down before anything else is drawn there, so repeated renders never leave
//! stale instances behind.

use std::mem;

use super::{ChartHandle, Placeholder, RenderTarget, Slot};
use crate::analytics::logger::LoadLog;
use crate::model::HealthMetrics;
use crate::view;

/// Painted when there is nothing to chart.
pub const EMPTY_PLACEHOLDER: Placeholder = Placeholder {
    width: 800,
    height: 300,
    background: "#64748b",
    text_color: "white",
    font: "16px Arial",
    message: "No health metrics data available",
    text_x: 50,
    text_y: 150,
};

/// Where the chart surface currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    Uninitialized,
    Rendered(ChartHandle),
    Empty,
}

#[derive(Debug)]
pub struct ChartRenderer {
    slot: Slot,
    state: ChartState,
    log: LoadLog,
}

impl ChartRenderer {
    pub fn new(log: LoadLog) -> Self {
        Self {
            slot: Slot::HealthChart,
            state: ChartState::Uninitialized,
            log,
        }
    }

    pub fn state(&self) -> ChartState {
        self.state
    }

    /// Chart the HRV and Recovery Score series.
    ///
    /// Missing, empty or misaligned series, and a surface that refuses the
    /// chart, all end in the empty state.
    pub fn render_series(&mut self, target: &mut dyn RenderTarget, metrics: HealthMetrics) {
        if !target.has(self.slot) {
            return;
        }

        let series = match metrics.into_series() {
            Ok(series) => series,
            Err(err) => {
                self.log.degraded("chart", &err);
                self.render_empty(target);
                return;
            }
        };

        let chart = view::chart_dataset(&series);
        self.teardown(target);
        match target.mount_chart(self.slot, &chart) {
            Ok(handle) => self.state = ChartState::Rendered(handle),
            Err(err) => {
                self.log.degraded("chart", format!("{err:#}"));
                self.render_empty(target);
            }
        }
    }

    /// Paint the "no data" placeholder straight onto the surface.
    pub fn render_empty(&mut self, target: &mut dyn RenderTarget) {
        if !target.has(self.slot) {
            return;
        }

        self.teardown(target);
        if let Err(err) = target.paint_placeholder(self.slot, &EMPTY_PLACEHOLDER) {
            self.log.degraded("chart", format!("{err:#}"));
        }
        self.state = ChartState::Empty;
    }

    fn teardown(&mut self, target: &mut dyn RenderTarget) {
        if let ChartState::Rendered(handle) = mem::replace(&mut self.state, ChartState::Uninitialized)
            && let Err(err) = target.destroy_chart(handle)
        {
            self.log.degraded("chart", format!("{err:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetricPoint;
    use crate::render::page::Page;

    fn metrics(hrv: usize, recovery: usize) -> HealthMetrics {
        let points = |n: usize, base: f64| {
            (0..n)
                .map(|i| MetricPoint {
                    date: format!("2024-03-{:02}", i + 1),
                    value: base + i as f64,
                })
                .collect::<Vec<_>>()
        };
        HealthMetrics {
            hrv: Some(points(hrv, 40.0)),
            recovery_score: Some(points(recovery, 70.0)),
        }
    }

    #[test]
    fn renders_series_onto_surface() {
        let mut page = Page::template();
        let mut chart = ChartRenderer::new(LoadLog::disabled());
        chart.render_series(&mut page, metrics(3, 3));

        assert!(matches!(chart.state(), ChartState::Rendered(_)));
        let mounted = page.chart(Slot::HealthChart).unwrap();
        assert_eq!(mounted.labels, ["01/03/24", "02/03/24", "03/03/24"]);
    }

    #[test]
    fn rerender_replaces_the_previous_instance() {
        let mut page = Page::template();
        let mut chart = ChartRenderer::new(LoadLog::disabled());
        chart.render_series(&mut page, metrics(2, 2));
        let ChartState::Rendered(first) = chart.state() else {
            panic!("first render failed");
        };
        chart.render_series(&mut page, metrics(4, 4));
        let ChartState::Rendered(second) = chart.state() else {
            panic!("second render failed");
        };

        assert_ne!(first, second);
        assert_eq!(page.live_charts(), 1);
        assert_eq!(page.chart(Slot::HealthChart).unwrap().labels.len(), 4);
    }

    #[test]
    fn missing_series_lands_in_empty() {
        let mut page = Page::template();
        let mut chart = ChartRenderer::new(LoadLog::disabled());
        chart.render_series(
            &mut page,
            HealthMetrics {
                hrv: None,
                ..metrics(2, 2)
            },
        );
        assert_eq!(chart.state(), ChartState::Empty);
        assert_eq!(
            page.placeholder(Slot::HealthChart).map(|p| p.message),
            Some("No health metrics data available")
        );
    }

    #[test]
    fn misaligned_series_lands_in_empty() {
        let mut page = Page::template();
        let mut chart = ChartRenderer::new(LoadLog::disabled());
        chart.render_series(&mut page, metrics(3, 2));
        assert_eq!(chart.state(), ChartState::Empty);
    }

    #[test]
    fn empty_after_rendered_tears_down_the_chart() {
        let mut page = Page::template();
        let mut chart = ChartRenderer::new(LoadLog::disabled());
        chart.render_series(&mut page, metrics(2, 2));
        chart.render_empty(&mut page);

        assert_eq!(chart.state(), ChartState::Empty);
        assert_eq!(page.live_charts(), 0);
        assert!(page.placeholder(Slot::HealthChart).is_some());
    }

    #[test]
    fn absent_surface_is_left_uninitialized() {
        let mut page = Page::with_slots(&[Slot::RecentActivity]);
        let mut chart = ChartRenderer::new(LoadLog::disabled());
        chart.render_series(&mut page, metrics(2, 2));
        chart.render_empty(&mut page);
        assert_eq!(chart.state(), ChartState::Uninitialized);
    }
}
