//! Validate, stamp, inspect and archive a plan.

use super::helpers::{project_with_plan, VALID_PLAN};
use devorch::commands::validate::Outcome;
use devorch::commands::{archive, commit_message, criteria, hash, validate, waves};
use devorch::error::DevorchError;
use devorch::plan::WaveType;

#[test]
fn test_valid_plan_passes_and_stamps() {
    let (_temp, plan) = project_with_plan(VALID_PLAN).unwrap();

    let report = validate::execute(&plan, true).unwrap();
    assert_eq!(report.result, Outcome::Continue);
    assert!(report.warnings.is_empty(), "unexpected warnings: {:?}", report.warnings);

    let check = hash::execute(&plan).unwrap();
    assert!(check.matches);
    assert_eq!(Some(check.hash.clone()), report.hash);

    // Re-validating the stamped plan yields the same hash.
    let again = validate::execute(&plan, false).unwrap();
    assert_eq!(again.hash, Some(check.hash));
}

#[test]
fn test_edited_plan_no_longer_matches_marker() {
    let (_temp, plan) = project_with_plan(VALID_PLAN).unwrap();
    validate::execute(&plan, true).unwrap();

    let stamped = std::fs::read_to_string(&plan).unwrap();
    std::fs::write(&plan, stamped.replace("fixed capacity", "configurable capacity")).unwrap();

    let check = hash::execute(&plan).unwrap();
    assert!(check.validated.is_some());
    assert!(!check.matches);
}

#[test]
fn test_structural_errors_block() {
    let broken = VALID_PLAN
        .replace("</phase2>", "")
        .replace("<phase3 name=\"Docs\">", "<phase4 name=\"Docs\">")
        .replace("</phase3>", "</phase4>");
    let (_temp, plan) = project_with_plan(&broken).unwrap();

    let report = validate::execute(&plan, true).unwrap();
    assert_eq!(report.result, Outcome::Block);
    assert!(report.hash.is_none());
    assert!(report
        .errors
        .contains(&"Phase 2: missing closing </phase2> tag".to_string()));
    assert!(report
        .errors
        .contains(&"Phase numbering not sequential: expected Phase 2, got Phase 4".to_string()));

    // Blocked plans are never stamped.
    assert!(!std::fs::read_to_string(&plan).unwrap().contains("Validated:"));
}

#[test]
fn test_waves_for_phase() {
    let (_temp, plan) = project_with_plan(VALID_PLAN).unwrap();

    let report = waves::execute(&plan, 1).unwrap();
    assert_eq!(report.waves.len(), 2);
    assert_eq!(report.waves[1].kind, WaveType::Validation);
    assert_eq!(report.tasks.len(), 2);
    assert_eq!(report.tasks["exports"].assigned_to, "builder-2");
    assert!(report.warnings.is_empty());

    let err = waves::execute(&plan, 9).unwrap_err();
    assert_eq!(
        err.downcast_ref::<DevorchError>().map(ToString::to_string),
        Some("Phase 9 not found. Available: 1, 2, 3".to_string())
    );
}

#[test]
fn test_criteria_and_commit_message() {
    let (temp, plan) = project_with_plan(VALID_PLAN).unwrap();

    let report = criteria::execute(&plan).unwrap();
    assert_eq!(report.total_phases, 3);
    assert_eq!(report.new_files, vec!["crates/core/src/cache.rs"]);
    assert_eq!(report.phases[0].criteria.len(), 2);

    let msg = commit_message::execute(2, Some(&plan), None, Some(temp.path())).unwrap();
    assert_eq!(msg.message, "phase(2): Route store reads through the cache");
}

#[test]
fn test_archive_moves_plan_into_archive_dir() {
    let (temp, plan) = project_with_plan(VALID_PLAN).unwrap();

    let report = archive::execute(&plan).unwrap();
    assert!(report.archived);
    assert_eq!(report.plan_name, "Widget Cache");
    assert!(!plan.exists());

    let archive_dir = temp.path().join(".devorch/plans/archive");
    let entries: Vec<String> = std::fs::read_dir(&archive_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].ends_with("-widget-cache.md"));
}
