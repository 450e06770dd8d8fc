use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::PlanContext;
use crate::config::Config;
use crate::error::DevorchError;
use crate::fs::Workspace;
use crate::plan::Plan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitMessage {
    pub message: String,
    pub phase: u32,
    /// The untruncated goal.
    pub goal: String,
}

impl CommitMessage {
    pub fn new(phase: u32, goal: &str, max_len: usize) -> Self {
        Self {
            message: format!("phase({phase}): {}", truncate(goal, max_len)),
            phase,
            goal: goal.to_string(),
        }
    }
}

/// Goal text comes from `goal` when given, otherwise from the phase's
/// `<goal>` tag in the plan.
pub fn execute(
    phase: u32,
    plan_path: Option<&Path>,
    goal: Option<&str>,
    project_root: Option<&Path>,
) -> Result<CommitMessage> {
    match (goal, plan_path) {
        (Some(goal), plan_path) => {
            let config = match (plan_path, project_root) {
                (Some(path), _) => PlanContext::open(path, project_root)?.config()?,
                (None, Some(root)) => Config::load(&Workspace::new(root))?,
                (None, None) => {
                    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
                    Config::load(&Workspace::new(cwd))?
                }
            };
            Ok(CommitMessage::new(phase, goal, config.commit_goal_max_len))
        }
        (None, Some(path)) => {
            let ctx = PlanContext::open(path, project_root)?;
            let goal = phase_goal(&ctx.plan, phase)?;
            Ok(CommitMessage::new(phase, &goal, ctx.config()?.commit_goal_max_len))
        }
        (None, None) => Err(DevorchError::MissingGoalSource.into()),
    }
}

fn phase_goal(plan: &Plan, phase: u32) -> Result<String, DevorchError> {
    plan.require_phase(phase)?
        .goal
        .clone()
        .filter(|g| !g.is_empty())
        .ok_or(DevorchError::MissingGoal(phase))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}
