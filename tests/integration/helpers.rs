//! Test helper functions for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A three-phase plan that passes validation.
pub const VALID_PLAN: &str = r#"# Plan: Widget Cache

<description>
Add an in-memory cache in front of the widget store.
</description>

<objective>
Widget reads are served from cache when warm.
</objective>

<classification>
Type: feature
Complexity: medium
Risk: low
</classification>

<decisions>
- LRU eviction with a fixed capacity.
</decisions>

<problem-statement>
Every widget read hits the database.
</problem-statement>

<solution-approach>
Wrap the store in a read-through cache.
</solution-approach>

<relevant-files>
### Core (`crates/core`)
- `crates/core/src/store.rs` — widget store
- `crates/core/src/lib.rs` — exports

<new-files>
- `crates/core/src/cache.rs` — the cache
</new-files>
</relevant-files>

<phase1 name="Cache">
<goal>Implement the LRU cache type</goal>
<tasks>
#### 1. Cache type
- **ID**: cache-type
- **Assigned To**: builder-1
- Create `crates/core/src/cache.rs`

#### 2. Exports
- **ID**: exports
- **Assigned To**: builder-2
- Update `crates/core/src/lib.rs`
</tasks>
<execution>
**Wave 1** (parallel): cache-type, exports
**Wave 2** (validation): validate-phase-1
</execution>
<criteria>
- [ ] Cache evicts least recently used entries
- [ ] Cache is exported from the crate
</criteria>
<validation>
- `cargo test -p core cache` — cache unit tests
</validation>
<handoff>
Cache type lives in crates/core/src/cache.rs.
</handoff>
</phase1>

<phase2 name="Integration">
<goal>Route store reads through the cache</goal>
<tasks>
#### 1. Read-through
- **ID**: read-through
- **Assigned To**: builder-1
- Edit `crates/core/src/store.rs`
</tasks>
<execution>
**Wave 1** (sequential): read-through
</execution>
<criteria>
- [ ] Warm reads skip the database
</criteria>
<validation>
- `cargo test -p core store` — store tests
</validation>
<handoff>
Store reads go through the cache.
</handoff>
</phase2>

<phase3 name="Docs">
<goal>Document cache sizing</goal>
<tasks>
#### 1. Docs
- **ID**: docs
- **Assigned To**: writer
- Update `docs/cache.md`
</tasks>
<execution>
**Wave 1**: docs
</execution>
<criteria>
- [ ] Capacity tuning documented
</criteria>
<validation>
- `mdbook build` — docs build
</validation>
</phase3>
"#;

/// Creates a project with the plan at `.devorch/plans/current.md`.
///
/// Returns the TempDir (keep it in scope) and the plan path.
pub fn project_with_plan(plan: &str) -> Result<(TempDir, PathBuf)> {
    let temp = TempDir::new().context("Failed to create temp directory")?;
    let plans = temp.path().join(".devorch").join("plans");
    std::fs::create_dir_all(&plans).context("Failed to create plans directory")?;
    let plan_path = plans.join("current.md");
    std::fs::write(&plan_path, plan).context("Failed to write plan")?;
    Ok((temp, plan_path))
}

/// Writes a file under `.devorch/` of the project.
pub fn write_workspace_file(project: &Path, name: &str, contents: &str) -> Result<()> {
    let path = project.join(".devorch").join(name);
    std::fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn read_workspace_file(project: &Path, name: &str) -> String {
    std::fs::read_to_string(project.join(".devorch").join(name)).unwrap_or_default()
}
