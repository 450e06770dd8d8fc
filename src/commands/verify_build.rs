use std::path::Path;

use anyhow::{Context, Result};

use super::PlanContext;
use crate::verify::{verify_new_files, BuildReport};

/// Check the plan's declared new files under `root` (default: the current
/// directory).
pub fn execute(plan_path: &Path, root: Option<&Path>, project_root: Option<&Path>) -> Result<BuildReport> {
    let ctx = PlanContext::open(plan_path, project_root)?;
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };
    let report = verify_new_files(
        &ctx.plan.new_files,
        &root,
        ctx.config()?.stub_min_meaningful_lines,
    );
    tracing::debug!(passed = report.passed, failed = report.failed, "verified new files");
    Ok(report)
}
