//! Server-side HTML for a [`Page`].
//!
//! Each slot becomes an element carrying the slot id. Actions turn into
//! plain links (and a POST form for generation), so the dashboard works
//! without any script. The chart is drawn as inline SVG.

use std::fmt::Write as _;

use crate::render::page::{Content, Page};
use crate::render::{Action, Entry, List, ListStyle, Placeholder, RenderTarget, Slot, Tone};
use crate::view::{AxisPosition, ChartDataset};

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 300.0;
const PLOT_LEFT: f64 = 60.0;
const PLOT_RIGHT: f64 = 740.0;
const PLOT_TOP: f64 = 30.0;
const PLOT_BOTTOM: f64 = 260.0;
const GRID_LINES: usize = 5;

/// Render the whole page as an HTML document.
pub fn render_page(page: &Page) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str(HEAD);

    html.push_str("<header><h1>Health Program Dashboard</h1></header>\n<main>\n");

    if [Slot::ProfileName, Slot::ProfileSubtitle, Slot::ProfileStats]
        .into_iter()
        .any(|s| page.has(s))
    {
        html.push_str("<section class=\"card profile\">\n");
        push_slot(&mut html, page, Slot::ProfileName, "h2");
        push_slot(&mut html, page, Slot::ProfileSubtitle, "p");
        push_slot(&mut html, page, Slot::ProfileStats, "div");
        if page.has(Slot::HealthGoals) {
            html.push_str("<h3>Health Goals</h3>\n");
            push_slot(&mut html, page, Slot::HealthGoals, "div");
        }
        if page.has(Slot::ConditionTags) {
            html.push_str("<h3>Conditions</h3>\n");
            push_slot(&mut html, page, Slot::ConditionTags, "div");
        }
        html.push_str("</section>\n");
    }

    html.push_str("<section class=\"counters\">\n");
    for (slot, label) in [
        (Slot::TotalDays, "Days in Program"),
        (Slot::TotalEvents, "Total Events"),
        (Slot::Breakthroughs, "Breakthroughs"),
        (Slot::TeamMembers, "Team Members"),
    ] {
        if page.has(slot) {
            html.push_str("<div class=\"card counter\">");
            push_slot(&mut html, page, slot, "span");
            let _ = writeln!(html, "<small>{label}</small></div>");
        }
    }
    html.push_str("</section>\n");

    if page.has(Slot::HealthChart) {
        html.push_str("<section class=\"card\"><h3>Health Metrics</h3>\n");
        push_slot(&mut html, page, Slot::HealthChart, "div");
        html.push_str("</section>\n");
    }

    if page.has(Slot::RecentActivity) {
        html.push_str("<section class=\"card\"><h3>Recent Activity</h3>\n");
        push_slot(&mut html, page, Slot::RecentActivity, "div");
        html.push_str("</section>\n");
    }

    if page.has(Slot::GenerateButton) {
        html.push_str("<section class=\"card\">\n");
        push_generate_form(&mut html, page);
        push_slot(&mut html, page, Slot::GenerationStatus, "div");
        html.push_str("</section>\n");
    }

    html.push_str("</main>\n");

    if page.is_visible(Slot::Modal) {
        push_modal(&mut html, page);
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Escape text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Link target for an action rendered as a plain anchor.
pub fn action_href(action: Action) -> String {
    match action {
        Action::OpenActivity(index) => format!("/activity/{index}"),
        Action::CloseModal => "/close".to_string(),
        Action::GenerateConversations => "/generate".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

fn push_slot(html: &mut String, page: &Page, slot: Slot, tag: &str) {
    let Some(region) = page.region(slot) else {
        return;
    };
    let hidden = if region.visible { "" } else { " hidden" };
    let _ = write!(html, "<{tag} id=\"{}\"{hidden}>", slot.id());
    push_content(html, &region.content);
    let _ = writeln!(html, "</{tag}>");
}

fn push_content(html: &mut String, content: &Content) {
    match content {
        Content::Empty => {}
        Content::Text { text } => html.push_str(&escape(text)),
        Content::List { list } => push_list(html, list),
        Content::Chart { chart, .. } => push_chart(html, chart),
        Content::Placeholder { placeholder } => push_placeholder(html, placeholder),
    }
}

fn push_list(html: &mut String, list: &List) {
    match list.style {
        ListStyle::Ordered | ListStyle::Unordered => {
            let tag = if list.style == ListStyle::Ordered { "ol" } else { "ul" };
            let _ = write!(html, "<{tag}>");
            for entry in &list.entries {
                let _ = write!(html, "<li>{}</li>", escape(&entry.text));
            }
            let _ = write!(html, "</{tag}>");
        }
        ListStyle::Tags => {
            for entry in &list.entries {
                let _ = write!(html, "<span class=\"tag\">{}</span>", escape(&entry.text));
            }
        }
        ListStyle::Fields => {
            for entry in &list.entries {
                push_field(html, entry);
            }
        }
        ListStyle::Activity => {
            html.push_str("<ul class=\"activity\">");
            for entry in &list.entries {
                html.push_str("<li>");
                match entry.action {
                    Some(action) => {
                        let _ = write!(
                            html,
                            "<a href=\"{}\">{}</a>",
                            escape(&action_href(action)),
                            escape(&entry.text)
                        );
                    }
                    None => html.push_str(&escape(&entry.text)),
                }
                if let Some(date) = &entry.secondary {
                    let _ = write!(html, " <span class=\"date\">{}</span>", escape(date));
                }
                html.push_str("</li>");
            }
            html.push_str("</ul>");
        }
        ListStyle::Status => {
            for entry in &list.entries {
                let tone = entry.tone.map(tone_class).unwrap_or("plain");
                let _ = write!(html, "<p class=\"{tone}\">{}</p>", escape(&entry.text));
            }
        }
    }
}

fn push_field(html: &mut String, entry: &Entry) {
    let label = entry.label.as_deref().map(escape).unwrap_or_default();
    if entry.block {
        let _ = write!(
            html,
            "<div class=\"field block\"><strong>{label}</strong><p>{}</p></div>",
            escape(&entry.text)
        );
    } else {
        let _ = write!(
            html,
            "<div class=\"field\"><strong>{label}:</strong> {}</div>",
            escape(&entry.text)
        );
    }
}

fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Info => "info",
        Tone::Success => "success",
        Tone::Warning => "warning",
        Tone::Error => "error",
    }
}

fn push_generate_form(html: &mut String, page: &Page) {
    let label = page.text(Slot::GenerateButton).unwrap_or_default();
    let disabled = if page.is_enabled(Slot::GenerateButton) {
        ""
    } else {
        " disabled"
    };
    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"{}\"><button id=\"{}\" type=\"submit\"{disabled}>{}</button></form>",
        action_href(Action::GenerateConversations),
        Slot::GenerateButton.id(),
        escape(label)
    );
}

fn push_modal(html: &mut String, page: &Page) {
    let close = action_href(Action::CloseModal);
    if page.has(Slot::ModalOverlay) {
        let _ = writeln!(
            html,
            "<a class=\"overlay\" id=\"{}\" href=\"{close}\"></a>",
            Slot::ModalOverlay.id()
        );
    }
    let _ = writeln!(html, "<div class=\"modal\" id=\"{}\">", Slot::Modal.id());
    if let Some(label) = page.text(Slot::ModalClose) {
        let _ = writeln!(
            html,
            "<a class=\"close\" id=\"{}\" href=\"{close}\">{}</a>",
            Slot::ModalClose.id(),
            escape(label)
        );
    }
    push_slot(html, page, Slot::ModalTitle, "h2");
    push_slot(html, page, Slot::ModalBody, "div");
    html.push_str("</div>\n");
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

fn push_placeholder(html: &mut String, placeholder: &Placeholder) {
    let _ = write!(
        html,
        "<svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\
         <rect width=\"{w}\" height=\"{h}\" fill=\"{bg}\"/>\
         <text x=\"{x}\" y=\"{y}\" fill=\"{fg}\" style=\"font: {font}\">{msg}</text></svg>",
        w = placeholder.width,
        h = placeholder.height,
        bg = escape(placeholder.background),
        x = placeholder.text_x,
        y = placeholder.text_y,
        fg = escape(placeholder.text_color),
        font = escape(placeholder.font),
        msg = escape(placeholder.message),
    );
}

/// Value range for one axis, padded when flat.
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    (min, max)
}

fn x_at(index: usize, count: usize) -> f64 {
    if count <= 1 {
        return (PLOT_LEFT + PLOT_RIGHT) / 2.0;
    }
    PLOT_LEFT + (PLOT_RIGHT - PLOT_LEFT) * index as f64 / (count - 1) as f64
}

fn y_at(value: f64, (min, max): (f64, f64)) -> f64 {
    PLOT_BOTTOM - (PLOT_BOTTOM - PLOT_TOP) * (value - min) / (max - min)
}

fn push_chart(html: &mut String, chart: &ChartDataset) {
    let _ = write!(
        html,
        "<svg width=\"{CHART_WIDTH}\" height=\"{CHART_HEIGHT}\" viewBox=\"0 0 {CHART_WIDTH} {CHART_HEIGHT}\" class=\"chart\">"
    );

    for axis in &chart.axes {
        let range = bounds(
            chart
                .datasets
                .iter()
                .filter(|d| d.axis == axis.id)
                .flat_map(|d| d.data.iter().copied()),
        );
        let (x, anchor) = match axis.position {
            AxisPosition::Left => (PLOT_LEFT - 6.0, "end"),
            AxisPosition::Right => (PLOT_RIGHT + 6.0, "start"),
        };

        for step in 0..=GRID_LINES {
            let value = range.0 + (range.1 - range.0) * step as f64 / GRID_LINES as f64;
            let y = y_at(value, range);
            if axis.grid {
                let _ = write!(
                    html,
                    "<line x1=\"{PLOT_LEFT}\" x2=\"{PLOT_RIGHT}\" y1=\"{y:.1}\" y2=\"{y:.1}\" stroke=\"#e2e8f0\"/>"
                );
            }
            let _ = write!(
                html,
                "<text x=\"{x}\" y=\"{:.1}\" text-anchor=\"{anchor}\" font-size=\"11\">{value:.0}</text>",
                y + 4.0
            );
        }

        let title_x = match axis.position {
            AxisPosition::Left => 14.0,
            AxisPosition::Right => CHART_WIDTH - 14.0,
        };
        let mid = (PLOT_TOP + PLOT_BOTTOM) / 2.0;
        let _ = write!(
            html,
            "<text x=\"{title_x}\" y=\"{mid}\" transform=\"rotate(-90 {title_x} {mid})\" text-anchor=\"middle\" font-size=\"12\">{}</text>",
            escape(axis.title)
        );
    }

    let count = chart.labels.len();
    let label_step = count.div_ceil(10).max(1);
    for (i, label) in chart.labels.iter().enumerate().step_by(label_step) {
        let _ = write!(
            html,
            "<text x=\"{:.1}\" y=\"{}\" text-anchor=\"middle\" font-size=\"11\">{}</text>",
            x_at(i, count),
            PLOT_BOTTOM + 18.0,
            escape(label)
        );
    }

    for (n, dataset) in chart.datasets.iter().enumerate() {
        let Some(axis) = chart.axis(dataset.axis) else {
            continue;
        };
        let range = bounds(
            chart
                .datasets
                .iter()
                .filter(|d| d.axis == axis.id)
                .flat_map(|d| d.data.iter().copied()),
        );
        let points: Vec<String> = dataset
            .data
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:.1},{:.1}", x_at(i, dataset.data.len()), y_at(*v, range)))
            .collect();
        let _ = write!(
            html,
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
            points.join(" "),
            escape(dataset.border_color)
        );

        let legend_x = PLOT_LEFT + 160.0 * n as f64;
        let _ = write!(
            html,
            "<rect x=\"{legend_x}\" y=\"8\" width=\"12\" height=\"12\" fill=\"{}\"/>\
             <text x=\"{}\" y=\"18\" font-size=\"12\">{}</text>",
            escape(dataset.border_color),
            legend_x + 16.0,
            escape(dataset.label)
        );
    }

    html.push_str("</svg>");
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Health Program Dashboard</title>
<style>
body { font-family: system-ui, sans-serif; background: #f8fafc; color: #0f172a; margin: 0; }
header { background: #1FB8CD; color: white; padding: 1rem 2rem; }
main { max-width: 960px; margin: 0 auto; padding: 1rem; }
.card { background: white; border-radius: 8px; padding: 1rem; margin-bottom: 1rem; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
.counters { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.counter span { display: block; font-size: 2rem; font-weight: bold; }
.tag { display: inline-block; background: #e2e8f0; border-radius: 999px; padding: 0.1rem 0.6rem; margin: 0.1rem; }
.activity .date { color: #64748b; font-size: 0.85rem; }
.field.block p { margin: 0.2rem 0 0.6rem; }
.info { color: #1FB8CD; } .success { color: #22c55e; } .warning { color: #f59e0b; } .error { color: #ef4444; }
.overlay { position: fixed; inset: 0; background: rgba(15,23,42,0.5); }
.modal { position: fixed; top: 10%; left: 50%; transform: translateX(-50%); width: min(600px, 90%); background: white; border-radius: 8px; padding: 1.5rem; }
.modal .close { float: right; text-decoration: none; font-size: 1.5rem; color: #64748b; }
</style>
</head>
<body>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn flat_series_gets_padded_range() {
        assert_eq!(bounds([5.0, 5.0].into_iter()), (4.0, 6.0));
        assert_eq!(bounds(std::iter::empty::<f64>()), (0.0, 1.0));
    }

    #[test]
    fn hidden_modal_is_not_rendered() {
        let html = render_page(&Page::template());
        assert!(!html.contains("id=\"episodeModal\""));
        assert!(html.contains("id=\"generateConversationsBtn\""));
    }

    #[test]
    fn disabled_button_carries_attribute() {
        let mut page = Page::template();
        page.set_enabled(Slot::GenerateButton, false).unwrap();
        assert!(render_page(&page).contains(" disabled>"));
    }

    #[test]
    fn partial_page_skips_missing_sections() {
        let page = Page::with_slots(&[Slot::RecentActivity]);
        let html = render_page(&page);
        assert!(html.contains("id=\"recentActivity\""));
        assert!(!html.contains("generateConversationsBtn"));
        assert!(!html.contains("healthMetricsChart"));
    }
}
