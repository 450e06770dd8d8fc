//! Build verification: declared new files must exist with real content.

pub mod artifacts;

pub use artifacts::{stub_indicators, verify_new_files, BuildReport, FileCheck, FileStatus};
