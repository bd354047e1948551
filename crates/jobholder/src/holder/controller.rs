use crate::common::manager::slurm::JOB_HELD_USER_REASON;
use crate::holder::config::{Constraint, Policy};
use crate::holder::job::Job;
use crate::holder::snapshot::JobSnapshot;
use crate::holder::{JobAction, JobId};

/// Outcome of a single decision cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: JobAction,
    /// Jobs that should be held or released, in the order in which the actions are executed.
    pub targets: Vec<JobId>,
    pub value_constrained: f64,
    /// All pending jobs, sorted by the ordering property from the highest value.
    pub candidates: Vec<JobId>,
}

impl Decision {
    pub fn is_noop(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Returns true if the scheduler reports that the job was held by its owner.
pub fn is_held_by_user(node_reason: &str) -> bool {
    node_reason
        .to_lowercase()
        .contains(&JOB_HELD_USER_REASON.to_lowercase())
}

/// Sums the constrained resource over running jobs.
/// Returns `None` for fairshare, which has to be queried from the scheduler.
pub fn constrained_value(jobs: &JobSnapshot, constraint: Constraint) -> Option<f64> {
    match constraint {
        Constraint::Fairshare => None,
        constraint => Some(
            jobs.running()
                .filter_map(|job| job.constraint_amount(constraint))
                .sum(),
        ),
    }
}

/// How much a released job is expected to add to the constrained value.
/// The fairshare score does not change by a known amount per job, so it counts as zero.
fn release_amount(job: &Job, constraint: Constraint) -> f64 {
    job.constraint_amount(constraint).unwrap_or(0.0)
}

/// Decides which pending jobs should be held or released.
///
/// If `value_constrained` has reached the ceiling, all pending jobs that were not already held
/// by the user are held. Otherwise pending jobs are released from the highest value of the
/// ordering property, as long as the constrained value stays within the ceiling. Releasing
/// stops at the first job that does not fit; later jobs are not considered even if they would.
pub fn decide(jobs: &JobSnapshot, policy: &Policy, value_constrained: f64) -> Decision {
    let mut pending: Vec<&Job> = jobs.pending().collect();
    // Stable sort, jobs with equal keys keep the order of the query
    pending.sort_by(|a, b| b.compare_by(a, policy.order_by()));
    let candidates = pending.iter().map(|job| job.id.clone()).collect();

    if value_constrained >= policy.value_max() {
        let targets = pending
            .iter()
            .filter(|job| !is_held_by_user(&job.node_reason))
            .map(|job| job.id.clone())
            .collect();
        Decision {
            action: JobAction::Hold,
            targets,
            value_constrained,
            candidates,
        }
    } else {
        let mut cumulative = 0.0;
        let targets = pending
            .iter()
            .map_while(|job| {
                cumulative += release_amount(job, policy.constraint());
                (value_constrained + cumulative <= policy.value_max()).then(|| job.id.clone())
            })
            .collect();
        Decision {
            action: JobAction::Release,
            targets,
            value_constrained,
            candidates,
        }
    }
}
