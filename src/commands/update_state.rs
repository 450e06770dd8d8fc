use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::PlanContext;
use crate::state::{StateRecord, StateTracker};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStateReport {
    pub state_file: String,
    pub history_appended: bool,
    pub plan_title: String,
    pub phase: u32,
}

/// Record that `phase` finished with `status`, rolling the previous summary
/// into the history log.
pub fn execute(
    plan_path: &Path,
    phase: u32,
    status: &str,
    summary: &str,
    project_root: Option<&Path>,
) -> Result<UpdateStateReport> {
    let ctx = PlanContext::open(plan_path, project_root)?;
    let tracker = StateTracker::new(ctx.workspace);
    let record = StateRecord {
        plan_title: ctx.plan.title,
        last_completed_phase: phase,
        status: status.to_string(),
        summary: summary.to_string(),
    };
    let update = tracker.record_phase_completion(&record)?;

    let workspace = tracker.workspace();
    Ok(UpdateStateReport {
        state_file: workspace.display_relative(&workspace.state_file()),
        history_appended: update.history_appended,
        plan_title: record.plan_title,
        phase,
    })
}
