//! Task and wave model for a single phase.
//!
//! Tasks come from `#### N. Title` sections of the `<tasks>` block; waves
//! from `**Wave N** (annotation): id, id` lines of the `<execution>` block.
//! Parsing is lenient: a task without an `**ID**` cannot be scheduled and is
//! set aside, and wave references to unknown ids are kept verbatim.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TASK_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^####\s+(\d+)\.\s+(.+)$").expect("static regex"));

static TASK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*ID\*\*:\s*(\S+)").expect("static regex"));

static TASK_ASSIGNEE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Assigned To\*\*:\s*(\S+)").expect("static regex"));

static BACKTICK_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("static regex"));

static FILE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\w{1,5}$").expect("static regex"));

static WAVE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*Wave\s+(\d+)\*\*\s*(?:\(([^)]*)\))?\s*:\s*(.+)").expect("static regex")
});

/// Task ids with this prefix name implicit validator tasks.
pub const VALIDATOR_TASK_PREFIX: &str = "validate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveType {
    Parallel,
    Sequential,
    Validation,
}

impl WaveType {
    /// Derive the wave type from its parenthesised annotation.
    pub fn from_annotation(annotation: &str) -> Self {
        let annotation = annotation.trim().to_lowercase();
        if annotation == "validation" {
            Self::Validation
        } else if annotation == "sequential" || annotation.starts_with("after wave") {
            Self::Sequential
        } else {
            Self::Parallel
        }
    }
}

impl fmt::Display for WaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => write!(f, "parallel"),
            Self::Sequential => write!(f, "sequential"),
            Self::Validation => write!(f, "validation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wave {
    #[serde(rename = "wave")]
    pub number: u32,
    #[serde(rename = "type")]
    pub kind: WaveType,
    pub task_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(skip)]
    pub number: u32,
    pub id: String,
    pub assigned_to: String,
    pub title: String,
    /// Heading line plus body, trailing whitespace removed.
    pub content: String,
    pub referenced_files: Vec<String>,
}

/// A task heading whose body carries no `**ID**` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnidentifiedTask {
    pub number: u32,
    pub title: String,
}

/// Two tasks in one wave whose referenced files overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveConflict {
    pub wave: u32,
    pub first: String,
    pub second: String,
    pub paths: Vec<String>,
}

/// A wave entry naming a task id that no task declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReference {
    pub wave: u32,
    pub task_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Identified tasks in declaration order, unique by id.
    pub tasks: Vec<Task>,
    pub unidentified: Vec<UnidentifiedTask>,
    /// Ids declared by more than one task; the later declaration wins.
    pub duplicate_ids: Vec<String>,
    pub waves: Vec<Wave>,
}

impl Schedule {
    pub fn parse(tasks_block: &str, execution_block: &str) -> Self {
        let mut schedule = Self {
            waves: parse_waves(execution_block),
            ..Self::default()
        };

        let headings: Vec<_> = TASK_HEADING.captures_iter(tasks_block).collect();
        for (idx, caps) in headings.iter().enumerate() {
            let Some(whole) = caps.get(0) else { continue };
            let end = headings
                .get(idx + 1)
                .and_then(|next| next.get(0))
                .map_or(tasks_block.len(), |m| m.start());
            let section = &tasks_block[whole.start()..end];
            let body = &tasks_block[whole.end()..end];

            let number: u32 = caps[1].parse().unwrap_or(0);
            let title = caps[2].trim().to_string();

            let Some(id) = first_capture(&TASK_ID, body) else {
                tracing::debug!(number, title = %title, "task without ID dropped");
                schedule.unidentified.push(UnidentifiedTask { number, title });
                continue;
            };

            let task = Task {
                number,
                assigned_to: first_capture(&TASK_ASSIGNEE, body).unwrap_or_default(),
                title,
                content: section.trim_end().to_string(),
                referenced_files: referenced_files(section),
                id,
            };
            schedule.insert(task);
        }

        schedule
    }

    fn insert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                if !self.duplicate_ids.contains(&task.id) {
                    self.duplicate_ids.push(task.id.clone());
                }
                *existing = task;
            }
            None => self.tasks.push(task),
        }
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Wave entries that name no declared task, excluding validator tasks.
    pub fn unknown_references(&self) -> Vec<UnknownReference> {
        self.waves
            .iter()
            .flat_map(|wave| {
                wave.task_ids
                    .iter()
                    .filter(|id| !id.starts_with(VALIDATOR_TASK_PREFIX))
                    .filter(|id| self.task(id.as_str()).is_none())
                    .map(|id| UnknownReference {
                        wave: wave.number,
                        task_id: id.clone(),
                    })
            })
            .collect()
    }

    /// Pairwise file overlaps between tasks placed in the same wave.
    pub fn conflicts(&self) -> Vec<WaveConflict> {
        let mut conflicts = Vec::new();
        for wave in &self.waves {
            let members: Vec<&Task> = self
                .tasks
                .iter()
                .filter(|t| wave.task_ids.contains(&t.id))
                .collect();

            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    let paths: Vec<String> = a
                        .referenced_files
                        .iter()
                        .filter(|f| b.referenced_files.contains(*f))
                        .cloned()
                        .collect();
                    if !paths.is_empty() {
                        conflicts.push(WaveConflict {
                            wave: wave.number,
                            first: a.id.clone(),
                            second: b.id.clone(),
                            paths,
                        });
                    }
                }
            }
        }
        conflicts
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].to_string())
}

/// Backtick spans that look like paths: containing `/` or ending in an extension.
pub fn referenced_files(text: &str) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for caps in BACKTICK_SPAN.captures_iter(text) {
        let token = caps[1].trim();
        let looks_like_path = token.contains('/') || FILE_EXTENSION.is_match(token);
        if looks_like_path && !files.iter().any(|f| f == token) {
            files.push(token.to_string());
        }
    }
    files
}

fn parse_waves(execution_block: &str) -> Vec<Wave> {
    WAVE_LINE
        .captures_iter(execution_block)
        .filter_map(|caps| {
            let number = caps[1].parse().ok()?;
            let annotation = caps.get(2).map_or("", |m| m.as_str());
            let task_ids = caps[3]
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect();
            Some(Wave {
                number,
                kind: WaveType::from_annotation(annotation),
                task_ids,
            })
        })
        .collect()
}
