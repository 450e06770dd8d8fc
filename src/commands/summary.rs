//! Build summary written once every phase has run.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;

use super::PlanContext;
use crate::fs::{write_atomic, Workspace};
use crate::git;
use crate::plan::{parse_file_entries, Plan};
use crate::state::StateTracker;

static PROJECT_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^###\s+(.+?)\s*\(`([^`]+)`\)").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub summary_file: String,
    pub phases_completed: usize,
    pub project_count: usize,
}

/// A `### Name (`path`)` group inside `<relevant-files>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub path: String,
    pub file_count: usize,
}

pub fn execute(plan_path: &Path, project_root: Option<&Path>) -> Result<SummaryReport> {
    let ctx = PlanContext::open(plan_path, project_root)?;
    let summaries = StateTracker::new(ctx.workspace.clone()).phase_summaries();
    let commits = recent_phase_commits(&ctx.workspace, ctx.config()?.commit_log_limit);
    let projects = projects(&ctx.plan.relevant_block);

    let document = render(&ctx.plan, &projects, &summaries, &commits, Utc::now());
    let path = ctx.workspace.summary_file();
    write_atomic(&path, &document)?;

    Ok(SummaryReport {
        summary_file: ctx.workspace.display_relative(&path),
        phases_completed: ctx.plan.phases.len(),
        project_count: projects.len(),
    })
}

pub fn projects(relevant_block: &str) -> Vec<Project> {
    let headings: Vec<_> = PROJECT_HEADING.captures_iter(relevant_block).collect();
    headings
        .iter()
        .enumerate()
        .filter_map(|(idx, caps)| {
            let start = caps.get(0)?.start();
            let end = headings
                .get(idx + 1)
                .and_then(|next| next.get(0))
                .map_or(relevant_block.len(), |m| m.start());
            Some(Project {
                name: caps[1].to_string(),
                path: caps[2].to_string(),
                file_count: parse_file_entries(&relevant_block[start..end]).len(),
            })
        })
        .collect()
}

fn recent_phase_commits(workspace: &Workspace, limit: usize) -> String {
    match git::recent_commits(workspace.project_root(), limit) {
        Ok(lines) if lines.is_empty() => "(no commits found)".to_string(),
        Ok(lines) => {
            let matching = git::orchestration_commits(&lines);
            if matching.is_empty() {
                "(no matching commits)".to_string()
            } else {
                matching.join("\n")
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "git log unavailable");
            "(git not available)".to_string()
        }
    }
}

pub fn render(
    plan: &Plan,
    projects: &[Project],
    summaries: &BTreeMap<u32, String>,
    commits: &str,
    completed_at: DateTime<Utc>,
) -> String {
    let mut parts = vec![
        format!("# Build Summary: {}", plan.title),
        format!(
            "Completed: {}",
            completed_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        String::new(),
        "## Objective".to_string(),
        plan.objective
            .clone()
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| "(no objective defined)".to_string()),
        String::new(),
        "## Key Decisions".to_string(),
        plan.decisions
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "(no decisions recorded)".to_string()),
        String::new(),
    ];

    if !projects.is_empty() {
        parts.push("## Projects".to_string());
        for project in projects {
            parts.push(format!(
                "- `{}` ({}) — {} files",
                project.path, project.name, project.file_count
            ));
        }
        parts.push(String::new());
    }

    if !plan.new_files.is_empty() {
        parts.push("## New Files".to_string());
        parts.extend(plan.new_files.iter().map(ToString::to_string));
        parts.push(String::new());
    }

    let modified = plan.modified_files();
    if !modified.is_empty() {
        parts.push("## Modified Files".to_string());
        parts.extend(modified.iter().map(ToString::to_string));
        parts.push(String::new());
    }

    parts.push("## Phase History".to_string());
    if plan.phases.is_empty() {
        parts.push("(no phase history available)".to_string());
        parts.push(String::new());
    }
    for phase in &plan.phases {
        parts.push(format!(
            "### Phase {}: {} — {}",
            phase.number,
            phase.name,
            phase.goal.as_deref().unwrap_or_default()
        ));
        parts.push(
            summaries
                .get(&phase.number)
                .cloned()
                .unwrap_or_else(|| "(no summary available)".to_string()),
        );
        parts.push(String::new());
    }

    parts.push("## Commits".to_string());
    parts.push(commits.to_string());
    parts.push(String::new());

    parts.join("\n")
}
