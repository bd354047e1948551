use std::collections::HashSet;
use std::time::Duration;

use derive_builder::Builder;
use log::LevelFilter;
use tokio_util::sync::CancellationToken;

use crate::common::WrappedRcRefCell;
use crate::holder::config::{Constraint, Policy, RunMode};
use crate::holder::handler::{HandlerFuture, SchedulerHandler};
use crate::holder::job::{Job, JobProperty};
use crate::holder::snapshot::{JobSnapshot, parse_job_record};
use crate::holder::{JobAction, JobId};

pub fn init_logging() {
    let _ = env_logger::Builder::default()
        .filter(None, LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// A single `squeue` record, see [`JobDefBuilder::line`].
#[derive(Builder, Clone)]
#[builder(pattern = "owned", build_fn(name = "finish"))]
pub struct JobDef {
    #[builder(setter(into))]
    id: String,
    #[builder(setter(into), default = "\"job\".to_string()")]
    name: String,
    #[builder(setter(into), default = "\"PENDING\".to_string()")]
    state: String,
    #[builder(setter(into), default = "\"2024-01-01T00:00:00\".to_string()")]
    submit_time: String,
    #[builder(setter(into), default = "\"short\".to_string()")]
    partition: String,
    #[builder(setter(into), default = "\"1:00:00\".to_string()")]
    time_limit: String,
    #[builder(setter(into), default = "1")]
    nodes: u32,
    #[builder(setter(into), default = "1")]
    cpus: u32,
    #[builder(setter(into), default = "\"4000M\".to_string()")]
    memory: String,
    #[builder(setter(into), default = "\"1:00:00\".to_string()")]
    time_left: String,
    #[builder(setter(into), default = "0.5")]
    priority: f64,
    #[builder(setter(into), default = "\"(Priority)\".to_string()")]
    reason: String,
}

impl JobDefBuilder {
    /// Renders the job as a whitespace separated `squeue` record.
    pub fn line(self) -> String {
        let JobDef {
            id,
            name,
            state,
            submit_time,
            partition,
            time_limit,
            nodes,
            cpus,
            memory,
            time_left,
            priority,
            reason,
        } = self.finish().unwrap();
        format!(
            "{id} {name} {state} {submit_time} {partition} {time_limit} {nodes} {cpus} {memory} {time_left} {priority} {reason}"
        )
    }

    pub fn build(self) -> Job {
        parse_job_record(&self.line()).unwrap()
    }
}

pub fn create_snapshot(jobs: Vec<JobDefBuilder>) -> JobSnapshot {
    JobSnapshot::new(jobs.into_iter().map(|job| job.build()).collect())
}

pub fn create_policy(constraint: Constraint, value_max: f64, order_by: JobProperty) -> Policy {
    Policy::new(
        "user".to_string(),
        constraint,
        value_max,
        order_by,
        Duration::from_secs(5),
        Duration::from_secs(60),
        false,
        RunMode::SingleShot,
    )
    .unwrap()
}

pub fn create_loop_policy(interval: Duration, duration: Duration, mode: RunMode) -> Policy {
    Policy::new(
        "user".to_string(),
        Constraint::Nodes,
        8.0,
        JobProperty::SubmitTime,
        interval,
        duration,
        false,
        mode,
    )
    .unwrap()
}

/// State of [`MockHandler`], shared with the test.
#[derive(Default)]
pub struct MockState {
    /// Output of the job query
    pub lines: Vec<String>,
    /// Fairshare score, the query fails if it is missing
    pub fairshare: Option<f64>,
    pub fail_job_query: bool,
    /// Simulated duration of the job query
    pub query_delay: Option<Duration>,
    /// Actions on these jobs fail
    pub failing_jobs: HashSet<JobId>,
    /// Token that is cancelled whenever an action is executed
    pub cancel_on_action: Option<CancellationToken>,

    pub job_queries: Vec<String>,
    pub fairshare_queries: usize,
    /// Successfully executed actions
    pub actions: Vec<(JobAction, JobId)>,
}

impl MockState {
    pub fn with_jobs(jobs: Vec<JobDefBuilder>) -> Self {
        Self {
            lines: jobs.into_iter().map(|job| job.line()).collect(),
            ..Default::default()
        }
    }
}

pub struct MockHandler {
    state: WrappedRcRefCell<MockState>,
}

impl MockHandler {
    pub fn new(state: WrappedRcRefCell<MockState>) -> Self {
        Self { state }
    }
}

impl SchedulerHandler for MockHandler {
    fn query_jobs(&self, username: &str) -> HandlerFuture<Vec<String>> {
        let state = self.state.clone();
        let username = username.to_string();
        Box::pin(async move {
            let delay = state.get().query_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let mut state = state.get_mut();
            state.job_queries.push(username);
            if state.fail_job_query {
                anyhow::bail!("squeue failed");
            }
            Ok(state.lines.clone())
        })
    }

    fn query_fairshare(&self, _username: &str) -> HandlerFuture<f64> {
        let state = self.state.clone();
        Box::pin(async move {
            let mut state = state.get_mut();
            state.fairshare_queries += 1;
            state
                .fairshare
                .ok_or_else(|| anyhow::anyhow!("sshare failed"))
        })
    }

    fn control_job(&self, action: JobAction, job_id: &str) -> HandlerFuture<()> {
        let state = self.state.clone();
        let job_id = job_id.to_string();
        Box::pin(async move {
            let mut state = state.get_mut();
            if let Some(token) = &state.cancel_on_action {
                token.cancel();
            }
            if state.failing_jobs.contains(&job_id) {
                anyhow::bail!("scontrol {action} {job_id} failed");
            }
            state.actions.push((action, job_id));
            Ok(())
        })
    }
}
