//! Plan document model.
//!
//! A [`Plan`] is rebuilt from source text on every invocation. Reading never
//! fails on missing optional structure: absent tags become `None` or empty
//! collections and the validator decides what is required.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::Serialize;

use super::phases::{split_phases, PhaseBounds};
use super::schedule::Schedule;
use super::tags::{extract_tag, extract_tag_or_empty};
use crate::error::DevorchError;

pub const UNTITLED_PLAN: &str = "Untitled Plan";

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+Plan:\s+(.+)$").expect("static regex"));

static FILE_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-*]\s+`([^`]+)`(?:\s*(?:—|--|-)\s*(.*))?").expect("static regex")
});

static VALIDATION_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-*]\s*`([^`]+)`\s*(?:—|--|-)\s*(.*)").expect("static regex")
});

static CHECKBOX_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s*\[.\]\s*").expect("static regex"));

static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s*").expect("static regex"));

static CLASS_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Type:\s*(feature|fix|refactor|migration|chore|enhancement)")
        .expect("static regex")
});

static CLASS_COMPLEXITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Complexity:\s*(simple|medium|complex)").expect("static regex")
});

static CLASS_RISK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Risk:\s*(low|medium|high)").expect("static regex"));

/// Kind of change a plan describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Feature,
    Fix,
    Refactor,
    Migration,
    Chore,
    Enhancement,
}

impl FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feature" => Ok(Self::Feature),
            "fix" => Ok(Self::Fix),
            "refactor" => Ok(Self::Refactor),
            "migration" => Ok(Self::Migration),
            "chore" => Ok(Self::Chore),
            "enhancement" => Ok(Self::Enhancement),
            other => Err(format!("unknown plan type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "medium" => Ok(Self::Medium),
            "complex" => Ok(Self::Complex),
            other => Err(format!("unknown complexity: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl FromStr for Risk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown risk: {other}")),
        }
    }
}

/// Parsed `<classification>` block. A field is `None` when its line is
/// missing or carries a value outside the allowed set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub kind: Option<PlanType>,
    pub complexity: Option<Complexity>,
    pub risk: Option<Risk>,
}

impl Classification {
    pub fn parse(block: &str) -> Self {
        fn field<T: FromStr>(re: &Regex, block: &str) -> Option<T> {
            re.captures(block).and_then(|caps| caps[1].parse().ok())
        }

        Self {
            kind: field(&CLASS_TYPE, block),
            complexity: field(&CLASS_COMPLEXITY, block),
            risk: field(&CLASS_RISK, block),
        }
    }

    /// Medium and complex plans are expected to explain the problem and approach.
    pub fn needs_rationale(&self) -> bool {
        matches!(
            self.complexity,
            Some(Complexity::Medium) | Some(Complexity::Complex)
        )
    }
}

/// A `` - `path` — description `` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: String,
    pub description: String,
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- `{}` — {}", self.path, self.description)
    }
}

/// Parse every file-list line in a block, in order.
pub fn parse_file_entries(block: &str) -> Vec<FileEntry> {
    block
        .lines()
        .filter_map(|line| FILE_ENTRY.captures(line))
        .map(|caps| FileEntry {
            path: caps[1].to_string(),
            description: caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
        })
        .collect()
}

/// A shell command listed under `<validation>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationCommand {
    pub command: String,
    pub description: String,
}

/// One phase of a plan with its tag blocks extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub number: u32,
    pub name: String,
    pub start_line: usize,
    pub closed: bool,
    /// Raw phase text including the open and close tag lines.
    pub content: String,
    pub goal: Option<String>,
    pub tasks: Option<String>,
    pub execution: Option<String>,
    pub criteria_block: Option<String>,
    pub validation_block: Option<String>,
    pub handoff: Option<String>,
    pub test_contract: Option<String>,
}

impl Phase {
    fn from_bounds(bounds: PhaseBounds) -> Self {
        let content = bounds.content;
        Self {
            number: bounds.number,
            name: bounds.name,
            start_line: bounds.start_line,
            closed: bounds.closed,
            goal: extract_tag(&content, "goal"),
            tasks: extract_tag(&content, "tasks"),
            execution: extract_tag(&content, "execution"),
            criteria_block: extract_tag(&content, "criteria"),
            validation_block: extract_tag(&content, "validation"),
            handoff: extract_tag(&content, "handoff"),
            test_contract: extract_tag(&content, "test-contract"),
            content,
        }
    }

    /// Acceptance criteria with bullets and checkbox markers stripped.
    pub fn criteria(&self) -> Vec<String> {
        let Some(block) = self.criteria_block.as_deref() else {
            return Vec::new();
        };
        block
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with(['-', '*', '[']))
            .map(|line| {
                let unchecked = CHECKBOX_PREFIX.replace(line, "");
                BULLET_PREFIX.replace(&unchecked, "").into_owned()
            })
            .collect()
    }

    pub fn validation_commands(&self) -> Vec<ValidationCommand> {
        let Some(block) = self.validation_block.as_deref() else {
            return Vec::new();
        };
        block
            .lines()
            .filter_map(|line| VALIDATION_COMMAND.captures(line.trim()))
            .map(|caps| ValidationCommand {
                command: caps[1].to_string(),
                description: caps[2].trim().to_string(),
            })
            .collect()
    }

    /// Tasks and waves declared by this phase.
    pub fn schedule(&self) -> Schedule {
        Schedule::parse(
            self.tasks.as_deref().unwrap_or_default(),
            self.execution.as_deref().unwrap_or_default(),
        )
    }
}

/// A parsed plan document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub title: String,
    pub description: Option<String>,
    pub objective: Option<String>,
    pub decisions: Option<String>,
    pub problem_statement: Option<String>,
    pub solution_approach: Option<String>,
    pub classification: Option<Classification>,
    /// Raw `<relevant-files>` block, including the nested `<new-files>`.
    pub relevant_block: String,
    pub relevant_files: Vec<FileEntry>,
    pub new_files: Vec<FileEntry>,
    /// Phases sorted by number.
    pub phases: Vec<Phase>,
    pub source: String,
}

impl Plan {
    pub fn parse(text: &str) -> Self {
        let relevant_block = extract_tag_or_empty(text, "relevant-files");
        let new_files = extract_tag(text, "new-files")
            .map(|block| parse_file_entries(&block))
            .unwrap_or_default();

        let phases: Vec<Phase> = split_phases(text)
            .into_iter()
            .map(Phase::from_bounds)
            .collect();
        tracing::debug!(phases = phases.len(), "parsed plan");

        Self {
            title: plan_title(text),
            description: extract_tag(text, "description"),
            objective: extract_tag(text, "objective"),
            decisions: extract_tag(text, "decisions"),
            problem_statement: extract_tag(text, "problem-statement"),
            solution_approach: extract_tag(text, "solution-approach"),
            classification: extract_tag(text, "classification").map(|b| Classification::parse(&b)),
            relevant_files: parse_file_entries(&relevant_block),
            relevant_block,
            new_files,
            phases,
            source: text.to_string(),
        }
    }

    /// Read and parse a plan file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_plan(path)?;
        Ok(Self::parse(&text))
    }

    pub fn phase(&self, number: u32) -> Option<&Phase> {
        self.phases.iter().find(|p| p.number == number)
    }

    /// Look up a phase or fail with the list of numbers that do exist.
    pub fn require_phase(&self, number: u32) -> Result<&Phase, DevorchError> {
        self.phase(number).ok_or_else(|| DevorchError::PhaseNotFound {
            phase: number,
            available: self.phase_list(),
        })
    }

    /// The handoff phase `number` receives from its predecessor.
    pub fn previous_handoff(&self, number: u32) -> Option<&str> {
        if number <= 1 {
            return None;
        }
        self.phase(number - 1)?.handoff.as_deref()
    }

    /// Relevant files that are not also declared as new.
    pub fn modified_files(&self) -> Vec<&FileEntry> {
        self.relevant_files
            .iter()
            .filter(|f| !self.new_files.iter().any(|n| n.path == f.path))
            .collect()
    }

    fn phase_list(&self) -> String {
        self.phases
            .iter()
            .map(|p| p.number.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Read plan text from disk, mapping failures to an input error.
pub fn read_plan(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| {
        DevorchError::PlanUnreadable {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// Title from the `# Plan: <title>` heading.
pub fn plan_title(text: &str) -> String {
    TITLE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(|| UNTITLED_PLAN.to_string())
}
