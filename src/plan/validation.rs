//! Structural validation of a parsed plan.
//!
//! Every check runs; nothing short-circuits. Errors mark structure that makes
//! downstream parsing unsafe and block the plan. Warnings are content-quality
//! issues, including wave cross-reference problems, and never block.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::hash::compute_hash;
use super::model::{Phase, Plan};
use super::tags::has_tag;

static WAVE_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Wave \d+\*\*").expect("static regex"));

const REQUIRED_PLAN_SECTIONS: &[&str] = &["description", "objective", "classification", "relevant-files"];

const REQUIRED_PHASE_SECTIONS: &[&str] = &["goal", "tasks", "execution", "criteria", "validation"];

/// A single validation message, optionally scoped to a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    pub phase: Option<u32>,
}

impl Finding {
    pub fn plan(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: None,
        }
    }

    pub fn phase(phase: u32, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: Some(phase),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            Some(n) => write!(f, "Phase {}: {}", n, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    /// Integrity hash, present only when there are no errors.
    pub hash: Option<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Validate a plan, collecting every error and warning.
pub fn validate(plan: &Plan) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_plan_sections(plan, &mut report);

    let phases = structural_phases(plan, &mut report);
    if phases.is_empty() {
        report.errors.push(Finding::plan(
            "No phases found (expected <phase1 name=\"...\">...</phase1>, <phase2 name=\"...\">..., etc.)",
        ));
    } else {
        check_numbering(&phases, &mut report);
        let count = phases.len();
        for phase in &phases {
            check_phase(phase, count, &mut report);
        }
    }

    if report.is_valid() {
        report.hash = Some(compute_hash(&plan.source));
    }
    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated plan"
    );
    report
}

fn check_plan_sections(plan: &Plan, report: &mut ValidationReport) {
    for section in REQUIRED_PLAN_SECTIONS {
        if !has_tag(&plan.source, section) {
            report
                .errors
                .push(Finding::plan(format!("Missing required section: {section}")));
        }
    }

    let Some(class) = &plan.classification else {
        return;
    };
    if class.kind.is_none() {
        report
            .errors
            .push(Finding::plan("Classification: missing or invalid Type"));
    }
    if class.complexity.is_none() {
        report
            .errors
            .push(Finding::plan("Classification: missing or invalid Complexity"));
    }
    if class.risk.is_none() {
        report
            .errors
            .push(Finding::plan("Classification: missing or invalid Risk"));
    }

    if class.needs_rationale() {
        for section in ["problem-statement", "solution-approach"] {
            if !has_tag(&plan.source, section) {
                report.warnings.push(Finding::plan(format!(
                    "Medium/complex plan missing <{section}> section"
                )));
            }
        }
    }
}

/// Phases usable for structural checks, in document order.
///
/// Unclosed phases and repeated openings of a number are reported as errors
/// and left out, since their extent is ambiguous.
fn structural_phases<'a>(plan: &'a Plan, report: &mut ValidationReport) -> Vec<&'a Phase> {
    let mut in_document_order: Vec<&Phase> = plan.phases.iter().collect();
    in_document_order.sort_by_key(|p| p.start_line);

    let mut seen = HashSet::new();
    let mut reported_duplicates = HashSet::new();
    let mut usable = Vec::new();
    for phase in in_document_order {
        if !seen.insert(phase.number) {
            if reported_duplicates.insert(phase.number) {
                report
                    .errors
                    .push(Finding::phase(phase.number, "opened more than once"));
            }
            continue;
        }
        if !phase.closed {
            report.errors.push(Finding::phase(
                phase.number,
                format!("missing closing </phase{}> tag", phase.number),
            ));
            continue;
        }
        usable.push(phase);
    }
    usable
}

fn check_numbering(phases: &[&Phase], report: &mut ValidationReport) {
    for (idx, phase) in phases.iter().enumerate() {
        let expected = idx + 1;
        if phase.number as usize != expected {
            report.errors.push(Finding::plan(format!(
                "Phase numbering not sequential: expected Phase {expected}, got Phase {}",
                phase.number
            )));
            break;
        }
    }
}

fn check_phase(phase: &Phase, phase_count: usize, report: &mut ValidationReport) {
    let n = phase.number;

    for section in REQUIRED_PHASE_SECTIONS {
        if !has_tag(&phase.content, section) {
            report
                .errors
                .push(Finding::phase(n, format!("missing {section} section")));
        }
    }

    if let Some(execution) = phase.execution.as_deref().filter(|e| !e.is_empty()) {
        if !WAVE_DECLARATION.is_match(execution) {
            report.warnings.push(Finding::phase(
                n,
                "Execution section missing Wave definitions",
            ));
        }
    }

    if phase.test_contract.as_deref() == Some("") {
        report
            .warnings
            .push(Finding::phase(n, "<test-contract> tag is empty"));
    }

    if (n as usize) < phase_count && !has_tag(&phase.content, "handoff") {
        report
            .warnings
            .push(Finding::phase(n, "missing <handoff> section"));
    }

    let schedule = phase.schedule();

    for task in &schedule.unidentified {
        report.warnings.push(Finding::phase(
            n,
            format!("task {} (\"{}\") missing ID metadata", task.number, task.title),
        ));
    }
    for task in schedule.tasks.iter().filter(|t| t.assigned_to.is_empty()) {
        report.warnings.push(Finding::phase(
            n,
            format!("task \"{}\" missing Assigned To metadata", task.id),
        ));
    }
    for id in &schedule.duplicate_ids {
        report
            .warnings
            .push(Finding::phase(n, format!("task ID \"{id}\" declared more than once")));
    }

    for unknown in schedule.unknown_references() {
        report.warnings.push(Finding::phase(
            n,
            format!(
                "Wave {} references unknown task ID \"{}\"",
                unknown.wave, unknown.task_id
            ),
        ));
    }

    for conflict in schedule.conflicts() {
        report.warnings.push(Finding::phase(
            n,
            format!(
                "Wave {} conflict: tasks \"{}\" and \"{}\" both touch: {}",
                conflict.wave,
                conflict.first,
                conflict.second,
                conflict.paths.join(", ")
            ),
        ));
    }
}
