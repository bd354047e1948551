mod common;
pub mod dryrun;
pub mod slurm;

use futures::future::LocalBoxFuture;

use crate::holder::JobAction;

pub type HandlerResult<T> = anyhow::Result<T>;
pub type HandlerFuture<T> = LocalBoxFuture<'static, HandlerResult<T>>;

/// Handler that can query and control jobs of some batch scheduler (e.g. Slurm).
///
/// None of the methods retries on failure; the caller decides what a failure means for the
/// current decision cycle.
pub trait SchedulerHandler {
    /// Returns raw job records of the given user, one per line, with columns in the order of
    /// [`crate::common::manager::slurm::SQUEUE_FIELDS`]. The output may start with a header line.
    fn query_jobs(&self, username: &str) -> HandlerFuture<Vec<String>>;

    /// Returns the fairshare score of the given user.
    fn query_fairshare(&self, username: &str) -> HandlerFuture<f64>;

    /// Holds or releases a single job.
    /// Holding an already held job (or releasing a job that is not held) is not an error.
    fn control_job(&self, action: JobAction, job_id: &str) -> HandlerFuture<()>;
}
