use std::path::Path;

use anyhow::Result;

use crate::plan::{check_integrity, read_plan, IntegrityCheck};

pub fn execute(plan_path: &Path) -> Result<IntegrityCheck> {
    let text = read_plan(plan_path)?;
    Ok(check_integrity(&text))
}
