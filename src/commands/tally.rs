use std::path::Path;

use anyhow::Result;

use super::PlanContext;
use crate::state::{tally, StateTracker, Tally};

/// Tally criteria against the recorded completion.
pub fn execute(plan_path: &Path, project_root: Option<&Path>) -> Result<Tally> {
    let ctx = PlanContext::open(plan_path, project_root)?;
    let completion = StateTracker::new(ctx.workspace).read_completion()?;
    Ok(tally(&ctx.plan, &completion))
}
