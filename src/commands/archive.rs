use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::plan::{plan_title, read_plan};

const ARCHIVE_DIR: &str = "archive";

static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveReport {
    pub archived: bool,
    pub from: String,
    pub to: String,
    pub plan_name: String,
}

/// Move a finished plan into `<plan dir>/archive/` under a dated name.
pub fn execute(plan_path: &Path) -> Result<ArchiveReport> {
    archive_on(plan_path, Local::now().date_naive())
}

pub fn archive_on(plan_path: &Path, date: NaiveDate) -> Result<ArchiveReport> {
    let text = read_plan(plan_path)?;
    let plan_name = plan_title(&text);

    let resolved = fs::canonicalize(plan_path)
        .with_context(|| format!("Failed to resolve plan path: {}", plan_path.display()))?;
    let archive_dir = resolved
        .parent()
        .map_or_else(|| PathBuf::from(ARCHIVE_DIR), |dir| dir.join(ARCHIVE_DIR));
    fs::create_dir_all(&archive_dir)
        .with_context(|| format!("Failed to create {}", archive_dir.display()))?;

    let target = archive_dir.join(archive_file_name(&plan_name, date));
    move_file(&resolved, &target)?;
    tracing::debug!(from = %resolved.display(), to = %target.display(), "archived plan");

    Ok(ArchiveReport {
        archived: true,
        from: plan_path.display().to_string(),
        to: target.to_string_lossy().replace('\\', "/"),
        plan_name,
    })
}

pub fn archive_file_name(title: &str, date: NaiveDate) -> String {
    format!("{}-{}.md", date.format("%Y-%m-%d"), kebab_case(title))
}

pub fn kebab_case(title: &str) -> String {
    NON_SLUG
        .replace_all(&title.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Rename, falling back to copy and delete across file systems.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    fs::remove_file(from).with_context(|| format!("Failed to remove {}", from.display()))?;
    Ok(())
}
