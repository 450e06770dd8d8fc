//! Phase context assembly against a real workspace.

use super::helpers::{project_with_plan, read_workspace_file, write_workspace_file, VALID_PLAN};
use devorch::commands::phase_context;
use serial_test::serial;

const CACHE: &str = "# Explore cache\n\n## crates/core\nStore and lib live here.\n\n## web\nFrontend bundle.\n\n## docs\nMdbook sources.\n";

#[test]
#[serial]
fn test_context_inline() {
    let (temp, plan) = project_with_plan(VALID_PLAN).unwrap();
    write_workspace_file(temp.path(), "CONVENTIONS.md", "Run rustfmt before committing.").unwrap();
    write_workspace_file(temp.path(), "explore-cache.md", CACHE).unwrap();

    let report = phase_context::execute(&plan, 2, None, None).unwrap();
    assert_eq!(report.phase_number, 2);
    assert_eq!(report.phase_name, "Integration");
    assert_eq!(report.total_phases, 3);
    assert_eq!(report.plan_title, "Widget Cache");
    assert!(report.content_file.is_none());
    assert!(report.tasks.contains_key("read-through"));

    let content = report.content.unwrap();
    assert!(content.starts_with("# Phase 2: Integration\n"));
    assert!(content.contains("## Previous Handoff\n\nCache type lives in crates/core/src/cache.rs.\n"));
    assert!(content.contains("## Conventions\n\nRun rustfmt before committing.\n"));
    assert!(content.contains("## crates/core"));
    assert!(!content.contains("## web"));
    assert!(!content.contains("## Current State"));
}

#[test]
#[serial]
fn test_cache_root_override() {
    let (temp, plan) = project_with_plan(VALID_PLAN).unwrap();
    let other = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(other.path().join(".devorch")).unwrap();
    std::fs::write(other.path().join(".devorch/explore-cache.md"), CACHE).unwrap();

    let report = phase_context::execute(&plan, 3, Some(other.path()), Some(temp.path())).unwrap();
    let content = report.content.unwrap();
    assert!(content.contains("## Explore Cache (filtered)"));
    assert!(content.contains("## docs\nMdbook sources."));
    assert!(!content.contains("## web"));
}

#[test]
#[serial]
fn test_large_context_spills_to_file() {
    let (temp, plan) = project_with_plan(VALID_PLAN).unwrap();
    write_workspace_file(temp.path(), "config.toml", "phase_context_threshold = 100\n").unwrap();

    let report = phase_context::execute(&plan, 1, None, None).unwrap();
    assert!(report.content.is_none());
    assert_eq!(report.content_file.as_deref(), Some(".devorch/.phase-context.md"));

    let spilled = read_workspace_file(temp.path(), ".phase-context.md");
    assert!(spilled.starts_with("# Phase 1: Cache\n"));

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("content").is_none());
    assert_eq!(json["contentFile"], ".devorch/.phase-context.md");
}
