//! Input errors.
//!
//! These are the only failures that abort a command with a non-zero exit.
//! Structural problems in a readable plan are reported as findings instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevorchError {
    #[error("Could not read plan: {}", path.display())]
    PlanUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No phases found in plan")]
    NoPhases,

    #[error("Phase {phase} not found. Available: {available}")]
    PhaseNotFound { phase: u32, available: String },

    #[error("Phase {0}: no <goal> tag found")]
    MissingGoal(u32),

    #[error("Either --plan or --goal is required")]
    MissingGoalSource,
}
