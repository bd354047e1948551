use std::cmp::Ordering;
use std::time::Duration;

use crate::holder::JobId;
use crate::holder::config::Constraint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Running,
    Pending,
    Other(String),
}

impl JobState {
    pub fn parse(state: &str) -> Self {
        match state {
            "RUNNING" => JobState::Running,
            "PENDING" => JobState::Pending,
            other => JobState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobState::Running => "RUNNING",
            JobState::Pending => "PENDING",
            JobState::Other(state) => state,
        }
    }
}

/// Job attributes that can be used to order pending jobs for release.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "snake_case")]
pub enum JobProperty {
    JobId,
    Name,
    State,
    SubmitTime,
    Partition,
    TimeLimit,
    Nodes,
    Cpus,
    Memory,
    TimeLeft,
    Priority,
    NodeReason,
}

/// One job of the queried user, as reported by `squeue`.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub state: JobState,
    pub submit_time: chrono::NaiveDateTime,
    pub partition: String,
    pub time_limit: Duration,
    pub nodes: u32,
    pub cpus: u32,
    /// Memory in the units reported by the scheduler.
    pub memory: f64,
    pub time_left: Duration,
    pub priority: f64,
    /// Reason for the pending state, or node list of a running job.
    pub node_reason: String,
}

impl Job {
    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    pub fn is_pending(&self) -> bool {
        self.state == JobState::Pending
    }

    /// How much of the constrained resource this job accounts for.
    /// Returns `None` for fairshare, which is not a property of individual jobs.
    pub fn constraint_amount(&self, constraint: Constraint) -> Option<f64> {
        match constraint {
            Constraint::Nodes => Some(self.nodes as f64),
            Constraint::Cpus => Some(self.cpus as f64),
            Constraint::Memory => Some(self.memory),
            Constraint::TimeLeft => Some(self.time_left.as_secs_f64()),
            Constraint::Jobs => Some(1.0),
            Constraint::Fairshare => None,
        }
    }

    /// Compares two jobs by the given property in ascending order.
    pub fn compare_by(&self, other: &Job, property: JobProperty) -> Ordering {
        match property {
            JobProperty::JobId => compare_job_ids(&self.id, &other.id),
            JobProperty::Name => self.name.cmp(&other.name),
            JobProperty::State => self.state.as_str().cmp(other.state.as_str()),
            JobProperty::SubmitTime => self.submit_time.cmp(&other.submit_time),
            JobProperty::Partition => self.partition.cmp(&other.partition),
            JobProperty::TimeLimit => self.time_limit.cmp(&other.time_limit),
            JobProperty::Nodes => self.nodes.cmp(&other.nodes),
            JobProperty::Cpus => self.cpus.cmp(&other.cpus),
            JobProperty::Memory => self.memory.total_cmp(&other.memory),
            JobProperty::TimeLeft => self.time_left.cmp(&other.time_left),
            JobProperty::Priority => self.priority.total_cmp(&other.priority),
            JobProperty::NodeReason => self.node_reason.cmp(&other.node_reason),
        }
    }
}

/// Numeric ids are compared as numbers, so that `100` comes after `99`.
/// Anything else (e.g. array jobs `12_3`) falls back to string comparison.
fn compare_job_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
