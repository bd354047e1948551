use std::collections::VecDeque;

use crate::common::WrappedRcRefCell;
use crate::holder::handler::{HandlerFuture, SchedulerHandler};
use crate::holder::{JobAction, JobId};

/// How many of the most recent actions are remembered.
const MAX_RECORDED_ACTIONS: usize = 1024;

#[derive(Default)]
struct ActionLog {
    recent: VecDeque<(JobAction, JobId)>,
    holds: u64,
    releases: u64,
}

/// Passes queries to the wrapped handler, but only records hold/release actions instead of
/// executing them.
pub struct DryRunHandler {
    inner: Box<dyn SchedulerHandler>,
    log: WrappedRcRefCell<ActionLog>,
}

impl DryRunHandler {
    pub fn new(inner: Box<dyn SchedulerHandler>) -> Self {
        Self {
            inner,
            log: Default::default(),
        }
    }

    /// Most recent actions that would have been executed, oldest first.
    pub fn recorded_actions(&self) -> Vec<(JobAction, JobId)> {
        self.log.get().recent.iter().cloned().collect()
    }

    /// Number of holds and releases that would have been executed since the start.
    pub fn action_counts(&self) -> (u64, u64) {
        let log = self.log.get();
        (log.holds, log.releases)
    }

    /// Logs what would have been done over the whole run.
    pub fn log_summary(&self) {
        let (holds, releases) = self.action_counts();
        log::info!("[dry run] Would have held {holds} and released {releases} job(s) in total");
        for (action, job_id) in self.recorded_actions() {
            log::debug!("[dry run] {action} {job_id}");
        }
    }
}

impl SchedulerHandler for DryRunHandler {
    fn query_jobs(&self, username: &str) -> HandlerFuture<Vec<String>> {
        self.inner.query_jobs(username)
    }

    fn query_fairshare(&self, username: &str) -> HandlerFuture<f64> {
        self.inner.query_fairshare(username)
    }

    fn control_job(&self, action: JobAction, job_id: &str) -> HandlerFuture<()> {
        log::info!("[dry run] Would {action} job {job_id}");
        let mut log = self.log.get_mut();
        match action {
            JobAction::Hold => log.holds += 1,
            JobAction::Release => log.releases += 1,
        }
        if log.recent.len() == MAX_RECORDED_ACTIONS {
            log.recent.pop_front();
        }
        log.recent.push_back((action, job_id.to_string()));
        Box::pin(async { Ok::<_, anyhow::Error>(()) })
    }
}
