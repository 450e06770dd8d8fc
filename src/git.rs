//! The only git query the tooling needs: recent orchestration commits.

use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;

static ORCHESTRATION_COMMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-f0-9]+\s+(phase\(|feat\(|fix\(|refactor\(|chore\(devorch\):\s*plan)")
        .expect("static regex")
});

/// `git log --oneline -<limit>` in `repo_root`.
pub fn recent_commits(repo_root: &Path, limit: usize) -> Result<Vec<String>> {
    let output = Command::new("git")
        .args(["log", "--oneline", &format!("-{limit}")])
        .current_dir(repo_root)
        .output()
        .context("Failed to run git log")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git log failed: {stderr}");
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Keep only commits written by the phase workflow.
pub fn orchestration_commits(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| ORCHESTRATION_COMMIT.is_match(line))
        .cloned()
        .collect()
}
