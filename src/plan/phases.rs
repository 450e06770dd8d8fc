//! Phase boundary scanning.
//!
//! Phases are delimited by `<phaseN name="...">` and `</phaseN>` lines and are
//! matched by their numeric suffix, not by nesting. A phase whose close tag is
//! never seen runs to the end of the document and is reported as unclosed so
//! the validator can reject it.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static PHASE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<phase(\d+)\s+name="([^"]*)">"#).expect("valid regex"));

static PHASE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</phase(\d+)>").expect("valid regex"));

/// One `<phaseN>` block located in the plan text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseBounds {
    pub number: u32,
    pub name: String,
    /// Zero-based line of the opening tag.
    pub start_line: usize,
    /// Exclusive end line; the close tag line is included in `content`.
    pub end_line: usize,
    pub content: String,
    pub closed: bool,
}

/// Split plan text into phase records sorted by phase number.
///
/// Openings are indexed by number on first sight. A close tag binds to the
/// first opening with the same number seen so far, so a later duplicate
/// opening never receives an end line.
pub fn split_phases(text: &str) -> Vec<PhaseBounds> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut phases: Vec<PhaseBounds> = Vec::new();
    let mut first_open: HashMap<u32, usize> = HashMap::new();

    for (idx, line) in lines.iter().enumerate() {
        if let Some(caps) = PHASE_OPEN.captures(line) {
            if let Ok(number) = caps[1].parse::<u32>() {
                first_open.entry(number).or_insert(phases.len());
                phases.push(PhaseBounds {
                    number,
                    name: caps[2].to_string(),
                    start_line: idx,
                    end_line: lines.len(),
                    content: String::new(),
                    closed: false,
                });
            }
        }

        if let Some(caps) = PHASE_CLOSE.captures(line) {
            let Ok(number) = caps[1].parse::<u32>() else {
                continue;
            };
            match first_open.get(&number) {
                Some(&slot) => {
                    let phase = &mut phases[slot];
                    phase.end_line = idx + 1;
                    phase.closed = true;
                }
                None => tracing::debug!(line = idx + 1, number, "close tag without opening"),
            }
        }
    }

    for phase in &mut phases {
        phase.content = lines[phase.start_line..phase.end_line].join("\n");
    }

    phases.sort_by_key(|p| p.number);
    phases
}

/// Phase numbers that were opened more than once, ascending.
pub fn duplicate_numbers(phases: &[PhaseBounds]) -> Vec<u32> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for phase in phases {
        *counts.entry(phase.number).or_default() += 1;
    }
    let mut dups: Vec<u32> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(number, _)| number)
        .collect();
    dups.sort_unstable();
    dups
}
