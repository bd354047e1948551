use crate::common::error::HolderError;
use crate::common::manager::slurm::{
    SQUEUE_FIELDS, parse_slurm_datetime, parse_slurm_duration, parse_slurm_memory,
};
use crate::holder::handler::SchedulerHandler;
use crate::holder::job::{Job, JobState};

/// Number of columns of a single job record.
pub const JOB_FIELD_COUNT: usize = SQUEUE_FIELDS.len();

/// Jobs of a single user at one point in time, in the order reported by the scheduler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSnapshot {
    jobs: Vec<Job>,
}

impl JobSnapshot {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn running(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|job| job.is_running())
    }

    pub fn pending(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|job| job.is_pending())
    }
}

/// Queries the jobs of `username` and parses them.
/// Any malformed record makes the whole snapshot fail.
pub async fn build_snapshot(
    handler: &dyn SchedulerHandler,
    username: &str,
) -> crate::Result<JobSnapshot> {
    let lines = handler
        .query_jobs(username)
        .await
        .map_err(|error| HolderError::QueryFailure(format!("job query: {error:?}")))?;
    log::debug!("Job query returned {} line(s)", lines.len());
    parse_snapshot(&lines)
}

pub fn parse_snapshot<S: AsRef<str>>(lines: &[S]) -> crate::Result<JobSnapshot> {
    let mut jobs = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() || (index == 0 && is_header_line(line)) {
            continue;
        }
        let job = parse_job_record(line).map_err(|reason| HolderError::MalformedRecord {
            line: index + 1,
            reason,
        })?;
        jobs.push(job);
    }
    Ok(JobSnapshot::new(jobs))
}

fn is_header_line(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|column| column.eq_ignore_ascii_case("JOBID"))
}

/// Splits a record into its columns. The last column takes the rest of the line, because the
/// reason may contain spaces.
fn split_record(line: &str) -> Result<[&str; JOB_FIELD_COUNT], String> {
    let mut columns = Vec::with_capacity(JOB_FIELD_COUNT);
    let mut rest = line.trim();
    while columns.len() < JOB_FIELD_COUNT - 1 && !rest.is_empty() {
        let (column, remainder) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        columns.push(column);
        rest = remainder.trim_start();
    }
    if !rest.is_empty() {
        columns.push(rest);
    }
    columns.try_into().map_err(|columns: Vec<&str>| {
        format!(
            "expected {JOB_FIELD_COUNT} columns, found {}",
            columns.len()
        )
    })
}

pub(crate) fn parse_job_record(line: &str) -> Result<Job, String> {
    let [
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
        node_reason,
    ] = split_record(line)?;

    let integer = |field: &str, value: &str| -> Result<u32, String> {
        value
            .parse::<u32>()
            .map_err(|error| format!("invalid {field} `{value}`: {error}"))
    };

    Ok(Job {
        id: id.to_string(),
        name: name.to_string(),
        state: JobState::parse(state),
        submit_time: parse_slurm_datetime(submit_time)
            .map_err(|error| format!("invalid submit time `{submit_time}`: {error}"))?,
        partition: partition.to_string(),
        time_limit: parse_slurm_duration(time_limit).map_err(|error| error.to_string())?,
        nodes: integer("node count", nodes)?,
        cpus: integer("CPU count", cpus)?,
        memory: parse_slurm_memory(memory).map_err(|error| error.to_string())?,
        time_left: parse_slurm_duration(time_left).map_err(|error| error.to_string())?,
        priority: priority
            .parse::<f64>()
            .map_err(|error| format!("invalid priority `{priority}`: {error}"))?,
        node_reason: node_reason.to_string(),
    })
}
