//! Phase execution context.
//!
//! Everything an executor needs for one phase, assembled into a single
//! markdown document: plan-level intent, the phase itself, the previous
//! handoff, project conventions, current state and the slice of the explore
//! cache that concerns the files this phase touches.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::PlanContext;
use crate::fs::{read_optional, write_atomic, WORKSPACE_DIR};
use crate::plan::schedule::referenced_files;
use crate::plan::{Phase, Plan, Task, Wave};

const EXPLORE_CACHE: &str = "explore-cache.md";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseContextReport {
    pub phase_number: u32,
    pub phase_name: String,
    pub total_phases: usize,
    pub plan_title: String,
    pub waves: Vec<Wave>,
    pub tasks: BTreeMap<String, Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_file: Option<String>,
}

/// Inputs read from the workspace alongside the plan.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceInputs {
    pub conventions: String,
    pub state: String,
    pub explore_cache: String,
}

pub fn execute(
    plan_path: &Path,
    phase: u32,
    cache_root: Option<&Path>,
    project_root: Option<&Path>,
) -> Result<PhaseContextReport> {
    let ctx = PlanContext::open(plan_path, project_root)?;
    let target = ctx.phase(phase)?;
    let workspace = &ctx.workspace;

    let cache_path = match cache_root {
        Some(root) => root.join(WORKSPACE_DIR).join(EXPLORE_CACHE),
        None => workspace.explore_cache_file(),
    };
    let inputs = WorkspaceInputs {
        conventions: read_optional(&workspace.conventions_file()),
        state: read_optional(&workspace.state_file()),
        explore_cache: read_optional(&cache_path),
    };

    let content = assemble(&ctx.plan, target, &inputs);
    let schedule = target.schedule();
    let mut report = PhaseContextReport {
        phase_number: target.number,
        phase_name: target.name.clone(),
        total_phases: ctx.plan.phases.len(),
        plan_title: ctx.plan.title.clone(),
        waves: schedule.waves,
        tasks: schedule
            .tasks
            .into_iter()
            .map(|task| (task.id.clone(), task))
            .collect(),
        content: None,
        content_file: None,
    };

    let length = content.chars().count();
    if length > ctx.config()?.phase_context_threshold {
        let path = workspace.phase_context_file();
        write_atomic(&path, &content)?;
        tracing::debug!(length, path = %path.display(), "phase context written to file");
        report.content_file = Some(workspace.display_relative(&path));
    } else {
        report.content = Some(content);
    }
    Ok(report)
}

/// Build the context document for `phase`.
pub fn assemble(plan: &Plan, phase: &Phase, inputs: &WorkspaceInputs) -> String {
    let mut parts: Vec<String> = vec![format!("# Phase {}: {}", phase.number, phase.name), String::new()];

    let mut section = |heading: &str, body: &str| {
        if body.is_empty() {
            return;
        }
        parts.push(format!("## {heading}"));
        parts.push(String::new());
        parts.push(body.to_string());
        parts.push(String::new());
    };

    section("Objective", plan.objective.as_deref().unwrap_or_default());
    section("Decisions", plan.decisions.as_deref().unwrap_or_default());
    section(
        "Solution Approach",
        plan.solution_approach.as_deref().unwrap_or_default(),
    );
    section("Phase Content", &phase.content);
    section(
        "Previous Handoff",
        plan.previous_handoff(phase.number).unwrap_or_default(),
    );
    section("Conventions", &inputs.conventions);
    section("Current State", &inputs.state);
    section(
        "Explore Cache (filtered)",
        &filter_explore_cache(&inputs.explore_cache, phase.tasks.as_deref().unwrap_or_default()),
    );

    parts.join("\n")
}

/// Keep the cache preamble plus the `## ` sections relevant to the files
/// named in `tasks_block`.
///
/// A section is relevant when it mentions a referenced path verbatim or,
/// failing that, the top-level directory of one (case-insensitively). With
/// no file references the cache is returned untouched.
pub fn filter_explore_cache(cache: &str, tasks_block: &str) -> String {
    if cache.is_empty() {
        return String::new();
    }
    let refs = referenced_files(tasks_block);
    if refs.is_empty() {
        return cache.to_string();
    }

    let top_dirs: Vec<String> = refs
        .iter()
        .filter_map(|r| r.split('/').next())
        .filter(|dir| !dir.is_empty())
        .map(str::to_lowercase)
        .collect();

    let kept: String = split_sections(cache)
        .into_iter()
        .filter(|section| {
            if !section.starts_with("## ") {
                return true;
            }
            if refs.iter().any(|r| section.contains(r.as_str())) {
                return true;
            }
            let lowered = section.to_lowercase();
            top_dirs.iter().any(|dir| lowered.contains(dir.as_str()))
        })
        .collect();
    kept.trim().to_string()
}

/// Split before every line that starts with `## `.
fn split_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.starts_with("## ") && offset > start {
            sections.push(&text[start..offset]);
            start = offset;
        }
        offset += line.len();
    }
    if start < text.len() {
        sections.push(&text[start..]);
    }
    sections
}
