use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::select_phase;
use crate::plan::{Plan, Schedule, Task, Wave};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WavesReport {
    pub waves: Vec<Wave>,
    pub tasks: BTreeMap<String, Task>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl WavesReport {
    pub fn from_schedule(schedule: Schedule) -> Self {
        let warnings = schedule_warnings(&schedule);
        let tasks = schedule
            .tasks
            .into_iter()
            .map(|task| (task.id.clone(), task))
            .collect();
        Self {
            waves: schedule.waves,
            tasks,
            warnings,
        }
    }
}

/// Waves and tasks of one phase, keyed for orchestrator lookup.
pub fn execute(plan_path: &Path, phase: u32) -> Result<WavesReport> {
    let plan = Plan::load(plan_path)?;
    let schedule = select_phase(&plan, phase)?.schedule();
    Ok(WavesReport::from_schedule(schedule))
}

/// Cross-reference problems worth surfacing alongside the schedule.
fn schedule_warnings(schedule: &Schedule) -> Vec<String> {
    let mut warnings = Vec::new();
    for unknown in schedule.unknown_references() {
        tracing::warn!(wave = unknown.wave, task = %unknown.task_id, "wave references unknown task");
        warnings.push(format!(
            "Wave {} references unknown task ID \"{}\"",
            unknown.wave, unknown.task_id
        ));
    }
    for conflict in schedule.conflicts() {
        tracing::warn!(
            wave = conflict.wave,
            first = %conflict.first,
            second = %conflict.second,
            "tasks in one wave touch the same files"
        );
        warnings.push(format!(
            "Wave {} conflict: tasks \"{}\" and \"{}\" both touch: {}",
            conflict.wave,
            conflict.first,
            conflict.second,
            conflict.paths.join(", ")
        ));
    }
    warnings
}
