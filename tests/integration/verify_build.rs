//! Build verification of declared new files.

use super::helpers::{project_with_plan, VALID_PLAN};
use devorch::commands::verify_build;
use devorch::verify::FileStatus;
use std::fs;

#[test]
fn test_real_file_passes() {
    let (temp, plan) = project_with_plan(VALID_PLAN).unwrap();
    let src = temp.path().join("crates/core/src");
    fs::create_dir_all(&src).unwrap();
    fs::write(
        src.join("cache.rs"),
        "pub struct Cache {\n    capacity: usize,\n}\n\nimpl Cache {\n    pub fn new(capacity: usize) -> Self {\n        Self { capacity }\n    }\n}\n",
    )
    .unwrap();

    let report = verify_build::execute(&plan, Some(temp.path()), None).unwrap();
    assert_eq!(report.total_files, 1);
    assert_eq!(report.passed, 1);
    assert_eq!(report.files[0].status, FileStatus::Ok);
}

#[test]
fn test_stub_file_fails() {
    let (temp, plan) = project_with_plan(VALID_PLAN).unwrap();
    let src = temp.path().join("crates/core/src");
    fs::create_dir_all(&src).unwrap();
    fs::write(
        src.join("cache.rs"),
        "pub fn get() {\n    // FIXME: real lookup\n    unimplemented!()\n}\n",
    )
    .unwrap();

    let report = verify_build::execute(&plan, Some(temp.path()), None).unwrap();
    assert_eq!(report.failed, 1);
    let file = &report.files[0];
    assert_eq!(file.status, FileStatus::Stub);
    assert_eq!(
        file.indicators,
        vec!["FIXME found on line 2", "unimplemented! found on line 3"]
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["files"][0]["status"], "stub");
    assert_eq!(json["totalFiles"], 1);
}

#[test]
fn test_missing_file() {
    let (temp, plan) = project_with_plan(VALID_PLAN).unwrap();
    let report = verify_build::execute(&plan, Some(temp.path()), None).unwrap();
    assert_eq!(report.files[0].status, FileStatus::Missing);
    assert_eq!(report.files[0].description, "the cache");
}
