//! The "Generate Conversations" control.
//!
//! The only part of the dashboard that reports failures to the user. A
//! refusal from the backend (`success: false`) and a request that never got
//! an answer produce different messages.

use std::time::Instant;

use anyhow::Result;

use crate::analytics::logger::{LoadLog, LoadLogEntry, LogOutcome};
use crate::api::{Backend, source};
use crate::model::GenerationResult;
use crate::render::page::GENERATE_LABEL;
use crate::render::{Entry, List, ListStyle, RenderTarget, Slot, Tone};

pub const BUSY_LABEL: &str = "Generating...";
pub const IN_PROGRESS: &str = "Connecting to Ollama and generating conversations...";
pub const RELOAD_PROMPT: &str = "Refresh the page to see the new conversations in the dashboard.";

/// How a generation request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The backend created this many conversations.
    Created(u64),
    /// The backend answered but refused, with its reason.
    Rejected(String),
    /// No usable answer came back.
    Unreachable(String),
}

impl GenerationOutcome {
    /// Status lines shown under the button once the request settles.
    pub fn status(&self, ollama_url: &str) -> List {
        let entries = match self {
            Self::Created(total) => vec![
                Entry::status(
                    Tone::Success,
                    format!("Successfully generated {total} conversations!"),
                ),
                Entry::text(RELOAD_PROMPT),
            ],
            Self::Rejected(error) => vec![Entry::status(Tone::Error, format!("Error: {error}"))],
            Self::Unreachable(error) => vec![
                Entry::status(
                    Tone::Error,
                    format!("Error generating conversations: {error}"),
                ),
                Entry::status(
                    Tone::Warning,
                    format!("Make sure Ollama is running on {ollama_url}"),
                ),
            ],
        };
        List::new(ListStyle::Status, entries)
    }
}

/// Ask the backend to generate conversations and report the result in the
/// status slot.
///
/// Returns `None` without touching anything when the button or the status
/// slot is missing. Otherwise the button is disabled for the duration of the
/// request and always restored afterwards.
pub fn run<B: Backend + ?Sized>(
    target: &mut dyn RenderTarget,
    backend: &B,
    ollama_url: &str,
    log: &LoadLog,
) -> Option<GenerationOutcome> {
    if !target.has(Slot::GenerateButton) || !target.has(Slot::GenerationStatus) {
        return None;
    }

    begin(target, log);

    let started = Instant::now();
    let result = backend.generate_conversations();
    let latency_ms = started.elapsed().as_millis() as u64;

    let outcome = match result {
        Ok(GenerationResult::Created {
            total_conversations,
        }) => {
            log.fetch_ok(source::GENERATION, latency_ms);
            GenerationOutcome::Created(total_conversations)
        }
        Ok(GenerationResult::Failed { error }) => {
            log.record(
                LoadLogEntry::new(source::GENERATION, LogOutcome::Rejected)
                    .with_detail(error.clone())
                    .with_latency(latency_ms),
            );
            GenerationOutcome::Rejected(error)
        }
        Err(err) => {
            log.fetch_failed(source::GENERATION, &err, latency_ms);
            GenerationOutcome::Unreachable(err.to_string())
        }
    };

    if let Err(err) = target.set_list(Slot::GenerationStatus, outcome.status(ollama_url)) {
        log.degraded("generation", format!("{err:#}"));
    }
    finish(target, log);

    Some(outcome)
}

fn begin(target: &mut dyn RenderTarget, log: &LoadLog) {
    let in_progress = List::new(
        ListStyle::Status,
        vec![Entry::status(Tone::Info, IN_PROGRESS)],
    );
    let writes = [
        target.set_enabled(Slot::GenerateButton, false),
        target.set_text(Slot::GenerateButton, BUSY_LABEL),
        target.set_list(Slot::GenerationStatus, in_progress),
    ];
    report(writes, log);
}

fn finish(target: &mut dyn RenderTarget, log: &LoadLog) {
    let writes = [
        target.set_enabled(Slot::GenerateButton, true),
        target.set_text(Slot::GenerateButton, GENERATE_LABEL),
    ];
    report(writes, log);
}

/// Log every failed write; one failure never skips the others.
fn report<const N: usize>(writes: [Result<()>; N], log: &LoadLog) {
    for err in writes.into_iter().filter_map(Result::err) {
        log.degraded("generation", format!("{err:#}"));
    }
}
