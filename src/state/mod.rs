//! Phase progress tracking: the state record, its history log and the
//! criteria tally derived from them.

pub mod record;
pub mod tally;

pub use record::{parse_history, Completion, StateRecord, StateTracker, StateUpdate};
pub use tally::{tally, PhaseStatus, PhaseTally, Tally, Verdict};
