//! File system adapters: workspace layout and atomic writes.

pub mod atomic;
pub mod workspace;

pub use atomic::{append_section, write_atomic};
pub use workspace::{read_optional, Workspace, WORKSPACE_DIR};
