//! Criteria tally.
//!
//! Completion is trusted, not re-verified: every criterion of a phase at or
//! below the last completed phase counts as passed, everything above counts
//! as pending.

use serde::Serialize;

use super::record::Completion;
use crate::plan::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Completed,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTally {
    pub phase: u32,
    pub name: String,
    pub total: usize,
    pub passed: usize,
    pub status: PhaseStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub total_criteria: usize,
    pub passed_criteria: usize,
    pub verdict: Verdict,
    pub last_completed_phase: u32,
    pub status: String,
    pub phases: Vec<PhaseTally>,
}

pub fn tally(plan: &Plan, completion: &Completion) -> Tally {
    let last = completion.last_completed_phase;
    let phases: Vec<PhaseTally> = plan
        .phases
        .iter()
        .map(|phase| {
            let total = phase.criteria().len();
            let done = phase.number <= last;
            PhaseTally {
                phase: phase.number,
                name: phase.name.clone(),
                total,
                passed: if done { total } else { 0 },
                status: if done {
                    PhaseStatus::Completed
                } else {
                    PhaseStatus::Pending
                },
            }
        })
        .collect();

    let total_criteria = phases.iter().map(|p| p.total).sum();
    let passed_criteria = phases.iter().map(|p| p.passed).sum();
    let all_complete = completion.is_completed() || last as usize >= phases.len();
    let verdict = if all_complete && passed_criteria == total_criteria {
        Verdict::Pass
    } else {
        Verdict::Fail
    };

    Tally {
        total_criteria,
        passed_criteria,
        verdict,
        last_completed_phase: last,
        status: completion.status.clone(),
        phases,
    }
}
