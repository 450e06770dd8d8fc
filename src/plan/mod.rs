//! Plan document parsing, scheduling, validation and hashing.
//!
//! Everything in this module is a pure function of the plan text, apart from
//! [`Plan::load`], which reads the file.

pub mod hash;
pub mod model;
pub mod phases;
pub mod schedule;
pub mod tags;
pub mod validation;

pub use hash::{check as check_integrity, compute_hash, embed_marker, IntegrityCheck};
pub use model::{
    parse_file_entries, plan_title, read_plan, Classification, Complexity, FileEntry, Phase, Plan,
    PlanType, Risk, ValidationCommand,
};
pub use phases::{split_phases, PhaseBounds};
pub use schedule::{Schedule, Task, Wave, WaveConflict, WaveType};
pub use tags::{extract_tag, extract_tag_or_empty, has_tag};
pub use validation::{validate, Finding, ValidationReport};
