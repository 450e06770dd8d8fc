use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::fs::write_atomic;
use crate::plan::{embed_marker, validate, Plan};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Continue,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateReport {
    pub result: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stamped: bool,
}

/// Validate the plan at `plan_path`; with `stamp`, record the hash in the
/// plan itself when it passes.
pub fn execute(plan_path: &Path, stamp: bool) -> Result<ValidateReport> {
    let plan = Plan::load(plan_path)?;
    let report = validate(&plan);
    let errors = report.error_messages();
    let warnings = report.warning_messages();

    let Some(hash) = report.hash else {
        tracing::debug!(errors = errors.len(), "plan blocked");
        return Ok(ValidateReport {
            result: Outcome::Block,
            hash: None,
            reason: Some(errors.join("; ")),
            errors,
            warnings,
            stamped: false,
        });
    };

    if stamp {
        write_atomic(plan_path, &embed_marker(&plan.source, &hash))
            .with_context(|| format!("Failed to stamp {}", plan_path.display()))?;
    }

    Ok(ValidateReport {
        result: Outcome::Continue,
        hash: Some(hash),
        reason: None,
        errors: Vec::new(),
        warnings,
        stamped: stamp,
    })
}
