pub mod config;
pub mod controller;
pub mod handler;
pub mod job;
pub mod process;
pub mod snapshot;

use std::fmt::{Display, Formatter};

pub use config::{Constraint, Policy, RunMode};
pub use controller::{Decision, constrained_value, decide, is_held_by_user};
pub use job::{Job, JobProperty, JobState};
pub use snapshot::{JobSnapshot, build_snapshot};

/// Job identifier as reported by the scheduler (e.g. `4641914` or `4641914_3`).
pub type JobId = String;

/// Action executed on a pending job through the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobAction {
    Hold,
    Release,
}

impl JobAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::Hold => "hold",
            JobAction::Release => "release",
        }
    }
}

impl Display for JobAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
