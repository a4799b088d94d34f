//! CLI command implementations for vitalboard.
//!
//! Provides subcommand handlers for:
//! - `vitalboard show [--event N]`: load the dashboard and print it
//! - `vitalboard serve`: serve the dashboard over HTTP
//! - `vitalboard generate`: trigger conversation generation
//! - `vitalboard health`: check config, backend and Ollama reachability
//! - `vitalboard config show|init|set|reset`: configuration management
//! - `vitalboard log [--limit N]`: summarize the load log

use anyhow::{Result, bail};
use colored::Colorize;

use crate::analytics::logger::{self, LoadLog, LogOutcome};
use crate::analytics::reporter;
use crate::api::http::HttpBackend;
use crate::api::ollama::{OllamaProbe, OllamaStatus};
use crate::config;
use crate::dashboard::generation::{self, GenerationOutcome};
use crate::dashboard::{Dashboard, LoadReport};
use crate::render::page::{Content, Page};
use crate::render::{Action, Entry, ListStyle, Slot, Tone};
use crate::view::ChartDataset;
use crate::web;

// ---------------------------------------------------------------------------
// vitalboard show
// ---------------------------------------------------------------------------

/// Load the dashboard into an in-memory page and print it.
///
/// `event` is the 1-based number of a recent-activity entry whose details
/// should be opened.
pub fn run_show(event: Option<usize>) -> Result<()> {
    let cfg = config::load();
    let mut dashboard = Dashboard::from_config(HttpBackend::from_config(&cfg.backend), &cfg);
    let mut page = Page::template();
    let report = dashboard.initialize(&mut page).unwrap_or_default();

    if let Some(number) = event {
        let available = dashboard.recent_events().len();
        if number == 0 || number > available {
            bail!("no activity entry {number} (the feed has {available})");
        }
        dashboard.dispatch(&mut page, Action::OpenActivity(number - 1));
    }

    print_page(&page);
    print_report(&report, cfg.backend.base_url.as_str());
    Ok(())
}

fn print_page(page: &Page) {
    println!("{}", "Health Program Dashboard".bold().cyan());
    println!("{}", "=".repeat(60));

    if let Some(name) = page.text(Slot::ProfileName) {
        println!();
        println!("{}", name.bold());
    }
    if let Some(subtitle) = page.text(Slot::ProfileSubtitle) {
        println!("{}", subtitle.dimmed());
    }
    print_list_slot(page, Slot::ProfileStats, None);
    print_list_slot(page, Slot::HealthGoals, Some("Health Goals"));
    print_list_slot(page, Slot::ConditionTags, Some("Conditions"));

    println!();
    for (slot, label) in [
        (Slot::TotalDays, "Days in Program"),
        (Slot::TotalEvents, "Total Events"),
        (Slot::Breakthroughs, "Breakthroughs"),
        (Slot::TeamMembers, "Team Members"),
    ] {
        if let Some(value) = page.text(slot) {
            println!("  {:<18} {}", label, value.bold());
        }
    }

    println!();
    println!("{}", "Health Metrics".bold());
    match page.region(Slot::HealthChart).map(|r| &r.content) {
        Some(Content::Chart { chart, .. }) => print_chart(chart),
        Some(Content::Placeholder { placeholder }) => {
            println!("  {}", placeholder.message.dimmed());
        }
        _ => println!("  {}", "-".dimmed()),
    }

    println!();
    println!("{}", "Recent Activity".bold());
    match page.region(Slot::RecentActivity).map(|r| &r.content) {
        Some(Content::List { list }) => {
            for (i, entry) in list.entries.iter().enumerate() {
                println!("  {}", format_entry(entry, ListStyle::Activity, i));
            }
        }
        Some(Content::Text { text }) => println!("  {}", text.dimmed()),
        _ => {}
    }

    if page.is_visible(Slot::Modal) {
        println!();
        println!("{}", "-".repeat(60));
        if let Some(title) = page.text(Slot::ModalTitle) {
            println!("{}", title.bold().cyan());
        }
        print_list_slot(page, Slot::ModalBody, None);
        println!("{}", "-".repeat(60));
    }

    print_list_slot(page, Slot::GenerationStatus, None);
}

fn print_list_slot(page: &Page, slot: Slot, heading: Option<&str>) {
    let Some(list) = page.list(slot) else {
        return;
    };
    if list.entries.is_empty() {
        return;
    }
    if let Some(heading) = heading {
        println!("{}", heading.bold());
    }
    for (i, entry) in list.entries.iter().enumerate() {
        let line = format_entry(entry, list.style, i);
        let line = match entry.tone {
            Some(Tone::Success) => line.green().to_string(),
            Some(Tone::Warning) => line.yellow().to_string(),
            Some(Tone::Error) => line.red().to_string(),
            Some(Tone::Info) => line.cyan().to_string(),
            None => line,
        };
        println!("  {line}");
    }
}

fn print_chart(chart: &ChartDataset) {
    if let (Some(first), Some(last)) = (chart.labels.first(), chart.labels.last()) {
        println!("  {}", format!("{first} – {last}").dimmed());
    }
    for dataset in &chart.datasets {
        let title = chart.axis(dataset.axis).map(|a| a.title).unwrap_or(dataset.label);
        println!("  {:<20} {}", title, sparkline(&dataset.data));
    }
}

fn print_report(report: &LoadReport, base_url: &str) {
    if report.fallback {
        println!();
        println!(
            "{} {}",
            "!".yellow().bold(),
            "Dashboard fell back to defaults".yellow()
        );
    }
    let failures = report.failures();
    if failures > 0 {
        println!();
        println!(
            "{}",
            format!("{failures} of {} sources unavailable from {base_url}", report.fetches.len())
                .dimmed()
        );
        for (source, outcome) in report.fetches.iter().filter(|(_, o)| o.is_failure()) {
            println!("  {} {:<16} {}", "✗".red(), source, format!("{outcome:?}").dimmed());
        }
    }
}

/// One line of plain text for a list entry.
fn format_entry(entry: &Entry, style: ListStyle, index: usize) -> String {
    match style {
        ListStyle::Ordered => format!("{}. {}", index + 1, entry.text),
        ListStyle::Unordered => format!("• {}", entry.text),
        ListStyle::Tags => format!("[{}]", entry.text),
        ListStyle::Fields => match &entry.label {
            Some(label) if entry.block => format!("{label}:\n    {}", entry.text),
            Some(label) => format!("{label}: {}", entry.text),
            None => entry.text.clone(),
        },
        ListStyle::Activity => match &entry.secondary {
            Some(date) => format!("[{}] {}  {}", index + 1, entry.text, date),
            None => format!("[{}] {}", index + 1, entry.text),
        },
        ListStyle::Status => entry.text.clone(),
    }
}

/// Unicode block sparkline of `values`.
fn sparkline(values: &[f64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                return BARS[BARS.len() / 2];
            }
            let level = ((v - min) / span * (BARS.len() - 1) as f64).round() as usize;
            BARS[level.min(BARS.len() - 1)]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// vitalboard serve
// ---------------------------------------------------------------------------

/// Serve the dashboard. `addr` overrides `web.addr`.
pub fn run_serve(addr: Option<String>) -> Result<()> {
    let cfg = config::load();
    let addr = addr.unwrap_or_else(|| cfg.web.addr.clone());
    web::serve(&cfg, &addr)
}

// ---------------------------------------------------------------------------
// vitalboard generate
// ---------------------------------------------------------------------------

/// Trigger conversation generation and print the status lines.
pub fn run_generate() -> Result<()> {
    let cfg = config::load();
    let backend = HttpBackend::from_config(&cfg.backend);
    let log = LoadLog::from_config(&cfg.logging);
    let mut page = Page::with_slots(&[Slot::GenerateButton, Slot::GenerationStatus]);

    println!("{}", generation::IN_PROGRESS.cyan());
    let outcome = generation::run(&mut page, &backend, &cfg.generation.ollama_url, &log);
    print_list_slot(&page, Slot::GenerationStatus, None);

    match outcome {
        Some(GenerationOutcome::Created(_)) | None => Ok(()),
        Some(GenerationOutcome::Rejected(_)) => bail!("the backend refused to generate conversations"),
        Some(GenerationOutcome::Unreachable(_)) => {
            bail!("could not reach {}", cfg.backend.base_url)
        }
    }
}

// ---------------------------------------------------------------------------
// vitalboard health
// ---------------------------------------------------------------------------

/// Check config files, backend reachability, Ollama and the load log.
pub fn run_health() -> Result<()> {
    println!("{}", "vitalboard Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.vitalboard/config.toml found"
        } else {
            "not found (run `vitalboard config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".vitalboard.toml found"
        } else {
            "none (optional)"
        },
    );

    let backend = HttpBackend::from_config(&cfg.backend);
    let backend_ok = backend.is_reachable();
    print_health_item(
        "Backend",
        backend_ok,
        &if backend_ok {
            format!("reachable at {}", backend.base_url())
        } else {
            format!("not reachable at {}", backend.base_url())
        },
    );
    print_health_item("Member", true, &format!("#{}", cfg.backend.member_id));

    let ollama = OllamaProbe::new(&cfg.generation.ollama_url).check();
    let (ollama_ok, ollama_detail) = match &ollama {
        OllamaStatus::Ready(models) => (true, format!("{} model(s): {}", models.len(), models.join(", "))),
        OllamaStatus::NoModels => (false, "reachable, but no models pulled".to_string()),
        OllamaStatus::Unreachable => (
            false,
            format!("not reachable at {} (is Ollama running?)", cfg.generation.ollama_url),
        ),
    };
    print_health_item("Ollama", ollama_ok, &ollama_detail);

    let log_path = logger::load_log_path();
    let log_exists = log_path.as_deref().is_some_and(|p| p.exists());
    let log_entries = match &log_path {
        Some(path) if log_exists => logger::read_entries(path).len(),
        _ => 0,
    };
    print_health_item(
        "Load log",
        log_exists,
        &if !cfg.logging.enabled {
            "disabled".to_string()
        } else if log_exists {
            format!("{log_entries} entries")
        } else {
            "no log file yet".to_string()
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// vitalboard config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective vitalboard Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    for (exists, name) in [
        (global_exists, "~/.vitalboard/config.toml"),
        (project_exists, ".vitalboard.toml"),
    ] {
        if exists {
            println!("  {} {}", "✓".green(), name.dimmed());
        } else {
            println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
        }
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "VITALBOARD_* environment variables".dimmed()
    );

    Ok(())
}

/// Write the annotated default config to `~/.vitalboard/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// vitalboard log
// ---------------------------------------------------------------------------

/// Summarize the newest `limit` load-log entries per source, then list them.
pub fn run_log(limit: usize) -> Result<()> {
    let entries = logger::load_log_path()
        .map(|path| logger::read_recent(&path, limit))
        .unwrap_or_default();

    if entries.is_empty() {
        println!(
            "{}",
            "No load log yet. Run `vitalboard show` or `vitalboard serve` first.".yellow()
        );
        return Ok(());
    }

    println!("{}", "vitalboard Load Log".bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "  {:<16} {:>6} {:>9} {:>9}",
        "Source".bold(),
        "Calls".bold(),
        "OK %".bold(),
        "Avg ms".bold()
    );
    for summary in reporter::summarize(&entries) {
        let avg = summary
            .avg_latency_ms
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<16} {:>6} {:>8.1}% {:>9}",
            summary.source,
            summary.total,
            summary.success_pct(),
            avg
        );
    }

    let fallbacks = reporter::fallback_count(&entries);
    if fallbacks > 0 {
        println!();
        println!("  {} {fallbacks} fallback render(s)", "!".yellow().bold());
    }

    println!();
    for entry in &entries {
        let outcome = format!("{:?}", entry.outcome).to_lowercase();
        let outcome = if entry.outcome == LogOutcome::Ok {
            outcome.green()
        } else {
            outcome.red()
        };
        println!(
            "  {} {:<16} {:<10} {}",
            entry.timestamp.get(..19).unwrap_or(entry.timestamp.as_str()).dimmed(),
            entry.source,
            outcome,
            entry.detail.as_deref().unwrap_or("").dimmed()
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
