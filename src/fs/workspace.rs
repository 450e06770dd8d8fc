//! Project workspace layout.
//!
//! Plans live in `<project>/.devorch/plans/`, so the project root is two
//! levels above the plan's directory unless given explicitly.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const WORKSPACE_DIR: &str = ".devorch";

const STATE_FILE: &str = "state.md";
const HISTORY_FILE: &str = "state-history.md";
const CONFIG_FILE: &str = "config.toml";
const CONVENTIONS_FILE: &str = "CONVENTIONS.md";
const EXPLORE_CACHE_FILE: &str = "explore-cache.md";
const PHASE_CONTEXT_FILE: &str = ".phase-context.md";
const SUMMARY_FILE: &str = "build-summary.md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    project_root: PathBuf,
}

impl Workspace {
    pub fn new<P: AsRef<Path>>(project_root: P) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    /// Resolve the workspace for a plan, preferring an explicit project root.
    pub fn for_plan(plan_path: &Path, project_root: Option<&Path>) -> Result<Self> {
        if let Some(root) = project_root {
            return Ok(Self::new(root));
        }
        Ok(Self::new(derive_project_root(plan_path)?))
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn dir(&self) -> PathBuf {
        self.project_root.join(WORKSPACE_DIR)
    }

    pub fn state_file(&self) -> PathBuf {
        self.dir().join(STATE_FILE)
    }

    pub fn history_file(&self) -> PathBuf {
        self.dir().join(HISTORY_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir().join(CONFIG_FILE)
    }

    pub fn conventions_file(&self) -> PathBuf {
        self.dir().join(CONVENTIONS_FILE)
    }

    pub fn explore_cache_file(&self) -> PathBuf {
        self.dir().join(EXPLORE_CACHE_FILE)
    }

    pub fn phase_context_file(&self) -> PathBuf {
        self.dir().join(PHASE_CONTEXT_FILE)
    }

    pub fn summary_file(&self) -> PathBuf {
        self.dir().join(SUMMARY_FILE)
    }

    /// Display form of a workspace path relative to the project root,
    /// always with forward slashes.
    pub fn display_relative(&self, path: &Path) -> String {
        match path.strip_prefix(&self.project_root) {
            Ok(relative) => relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path.to_string_lossy().replace('\\', "/"),
        }
    }
}

fn derive_project_root(plan_path: &Path) -> Result<PathBuf> {
    let plan = fs::canonicalize(plan_path)
        .or_else(|_| std::path::absolute(plan_path))
        .with_context(|| format!("Failed to resolve plan path: {}", plan_path.display()))?;
    let plan_dir = plan.parent().unwrap_or(&plan);
    let root = plan_dir
        .parent()
        .and_then(Path::parent)
        .unwrap_or(plan_dir);
    Ok(root.to_path_buf())
}

/// Read an optional input file; absence yields an empty string.
pub fn read_optional(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable optional file");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_root_from_plan_location() {
        let dir = TempDir::new().unwrap();
        let plans = dir.path().join(".devorch").join("plans");
        fs::create_dir_all(&plans).unwrap();
        let plan = plans.join("current.md");
        fs::write(&plan, "# Plan: X").unwrap();

        let ws = Workspace::for_plan(&plan, None).unwrap();
        assert_eq!(ws.project_root(), fs::canonicalize(dir.path()).unwrap());
        assert_eq!(ws.state_file(), ws.project_root().join(".devorch/state.md"));
    }

    #[test]
    fn test_explicit_project_root_wins() {
        let ws = Workspace::for_plan(Path::new("/nowhere/plan.md"), Some(Path::new("/repo"))).unwrap();
        assert_eq!(ws.project_root(), Path::new("/repo"));
        assert_eq!(ws.history_file(), PathBuf::from("/repo/.devorch/state-history.md"));
    }

    #[test]
    fn test_display_relative() {
        let ws = Workspace::new("/repo");
        assert_eq!(ws.display_relative(&ws.state_file()), ".devorch/state.md");
        assert_eq!(ws.display_relative(Path::new("/other/x.md")), "/other/x.md");
    }

    #[test]
    fn test_read_optional_missing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_optional(&dir.path().join("absent.md")), "");
    }
}
