//! One module per subcommand.
//!
//! Each `execute` function does the work and returns a serializable report; the
//! binary prints it as a single JSON object via [`output::emit`].

pub mod archive;
pub mod commit_message;
pub mod criteria;
pub mod hash;
pub mod output;
pub mod phase_context;
pub mod summary;
pub mod tally;
pub mod update_state;
pub mod validate;
pub mod verify_build;
pub mod waves;

use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::error::DevorchError;
use crate::fs::Workspace;
use crate::plan::{Phase, Plan};

/// A loaded plan with the workspace that applies to it.
#[derive(Debug)]
pub struct PlanContext {
    pub plan: Plan,
    pub workspace: Workspace,
}

impl PlanContext {
    pub fn open(plan_path: &Path, project_root: Option<&Path>) -> Result<Self> {
        let plan = Plan::load(plan_path)?;
        let workspace = Workspace::for_plan(plan_path, project_root)?;
        Ok(Self { plan, workspace })
    }

    /// Tunables for this workspace. Only commands that use one call this,
    /// so a broken config file does not block the rest.
    pub fn config(&self) -> Result<Config> {
        Config::load(&self.workspace)
    }

    pub fn phase(&self, number: u32) -> Result<&Phase> {
        select_phase(&self.plan, number)
    }
}

/// Resolve a phase for phase-scoped commands.
pub fn select_phase(plan: &Plan, number: u32) -> Result<&Phase> {
    if plan.phases.is_empty() {
        return Err(DevorchError::NoPhases.into());
    }
    Ok(plan.require_phase(number)?)
}
