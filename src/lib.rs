pub mod commands;
pub mod completions;
pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod plan;
pub mod state;
pub mod verify;
