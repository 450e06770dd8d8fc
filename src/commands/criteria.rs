use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::plan::{Phase, Plan, ValidationCommand};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseCriteria {
    pub phase: u32,
    pub name: String,
    pub goal: String,
    pub criteria: Vec<String>,
    pub validation_commands: Vec<ValidationCommand>,
}

impl From<&Phase> for PhaseCriteria {
    fn from(phase: &Phase) -> Self {
        Self {
            phase: phase.number,
            name: phase.name.clone(),
            goal: phase.goal.clone().unwrap_or_default(),
            criteria: phase.criteria(),
            validation_commands: phase.validation_commands(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaReport {
    pub objective: String,
    pub total_phases: usize,
    pub relevant_files: Vec<String>,
    pub new_files: Vec<String>,
    pub phases: Vec<PhaseCriteria>,
}

impl CriteriaReport {
    pub fn from_plan(plan: &Plan) -> Self {
        Self {
            objective: plan.objective.clone().unwrap_or_default(),
            total_phases: plan.phases.len(),
            relevant_files: plan.relevant_files.iter().map(|f| f.path.clone()).collect(),
            new_files: plan.new_files.iter().map(|f| f.path.clone()).collect(),
            phases: plan.phases.iter().map(PhaseCriteria::from).collect(),
        }
    }
}

/// Acceptance criteria and validation commands of every phase.
pub fn execute(plan_path: &Path) -> Result<CriteriaReport> {
    Ok(CriteriaReport::from_plan(&Plan::load(plan_path)?))
}
