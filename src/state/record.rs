//! The persisted state record and its history log.
//!
//! `state.md` only ever describes the most recently completed phase. Before it
//! is overwritten, its phase-summary section is appended to
//! `state-history.md`. Writes are atomic but not locked: concurrent updates
//! against one workspace race.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use crate::fs::{append_section, read_optional, write_atomic, Workspace};

pub const NOT_STARTED: &str = "not started";
pub const UNKNOWN_STATUS: &str = "unknown";
pub const COMPLETED: &str = "completed";

const PHASE_SECTION_MARKER: &str = "## Phase";

static LAST_COMPLETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Last completed phase:\s*(\d+)").expect("static regex"));

static STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Status:\s*(.+)").expect("static regex"));

static HISTORY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"## Phase\s+\d+").expect("static regex"));

static HISTORY_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^## Phase\s+(\d+)\s+Summary[ \t]*\r?\n([\s\S]*)").expect("static regex")
});

/// Contents of `state.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecord {
    pub plan_title: String,
    pub last_completed_phase: u32,
    pub status: String,
    pub summary: String,
}

impl StateRecord {
    pub fn render(&self) -> String {
        format!(
            "# devorch State\n- Plan: {}\n- Last completed phase: {}\n- Status: {}\n\n## Phase {} Summary\n{}\n",
            self.plan_title,
            self.last_completed_phase,
            self.status,
            self.last_completed_phase,
            self.summary
        )
    }
}

/// How far execution has progressed, as recorded in `state.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub last_completed_phase: u32,
    pub status: String,
}

impl Completion {
    pub fn not_started() -> Self {
        Self {
            last_completed_phase: 0,
            status: NOT_STARTED.to_string(),
        }
    }

    pub fn parse(state: &str) -> Self {
        let last_completed_phase = LAST_COMPLETED
            .captures(state)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0);
        let status = STATUS
            .captures(state)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_else(|| UNKNOWN_STATUS.to_string());
        Self {
            last_completed_phase,
            status,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED
    }
}

/// Outcome of recording a phase completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateUpdate {
    pub history_appended: bool,
}

/// Reads and writes the state record of one workspace.
#[derive(Debug, Clone)]
pub struct StateTracker {
    workspace: Workspace,
}

impl StateTracker {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Record that `record.last_completed_phase` finished.
    ///
    /// The previous record's phase section, if any, is moved to the history
    /// log first; then `state.md` is replaced.
    pub fn record_phase_completion(&self, record: &StateRecord) -> Result<StateUpdate> {
        let state_path = self.workspace.state_file();
        let mut history_appended = false;

        match fs::read_to_string(&state_path) {
            Ok(previous) => {
                if let Some(section) = phase_section(&previous) {
                    append_section(&self.workspace.history_file(), section)
                        .context("Failed to append state history")?;
                    history_appended = true;
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %state_path.display(), error = %e, "previous state unreadable, starting fresh");
            }
        }

        write_atomic(&state_path, &record.render()).context("Failed to write state record")?;
        tracing::debug!(
            phase = record.last_completed_phase,
            history_appended,
            "recorded phase completion"
        );
        Ok(StateUpdate { history_appended })
    }

    /// Current completion, or "not started" when no state exists yet.
    pub fn read_completion(&self) -> Result<Completion> {
        let path = self.workspace.state_file();
        match fs::read_to_string(&path) {
            Ok(state) => Ok(Completion::parse(&state)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Completion::not_started()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Phase summaries keyed by phase number, from the history log and then
    /// the current record. Later entries for the same phase win.
    pub fn phase_summaries(&self) -> BTreeMap<u32, String> {
        let mut summaries = parse_history(&read_optional(&self.workspace.history_file()));
        let current = read_optional(&self.workspace.state_file());
        if let Some(section) = phase_section(&current) {
            summaries.extend(parse_history(section));
        }
        summaries
    }
}

/// The trimmed text from the first `## Phase` heading to the end.
fn phase_section(state: &str) -> Option<&str> {
    state
        .find(PHASE_SECTION_MARKER)
        .map(|start| state[start..].trim())
        .filter(|s| !s.is_empty())
}

/// Split a history log into `## Phase N Summary` sections.
pub fn parse_history(history: &str) -> BTreeMap<u32, String> {
    let starts: Vec<usize> = HISTORY_HEADING.find_iter(history).map(|m| m.start()).collect();
    let mut sections = BTreeMap::new();
    for (idx, start) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(history.len());
        let Some(caps) = HISTORY_SECTION.captures(&history[*start..end]) else {
            continue;
        };
        if let Ok(phase) = caps[1].parse::<u32>() {
            sections.insert(phase, caps[2].trim().to_string());
        }
    }
    sections
}
