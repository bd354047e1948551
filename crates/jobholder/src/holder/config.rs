use std::time::Duration;

use crate::common::error::HolderError;
use crate::holder::job::JobProperty;

/// Default ceiling of the constrained value.
pub const DEFAULT_VALUE_MAX: f64 = 12.0;

/// Default delay between the end of one decision cycle and the start of the next one.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Default total lifetime of the daemon.
pub const DEFAULT_TOTAL_DURATION: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Resource whose sum over running jobs is compared with the ceiling.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "snake_case")]
pub enum Constraint {
    /// Number of nodes
    Nodes,
    /// Number of CPUs
    Cpus,
    /// Memory, in the units reported by the scheduler
    Memory,
    /// Remaining walltime, in seconds
    TimeLeft,
    /// Number of running jobs
    #[value(alias = "job-count")]
    Jobs,
    /// Fairshare score of the user, as reported by `sshare`
    Fairshare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Repeat decision cycles until the total duration elapses or the daemon is stopped.
    Daemon,
    /// Run a single decision cycle and exit.
    SingleShot,
}

/// Immutable configuration of the holder, validated on construction.
#[derive(Debug, Clone)]
pub struct Policy {
    username: String,
    constraint: Constraint,
    value_max: f64,
    order_by: JobProperty,
    interval: Duration,
    total_duration: Duration,
    dry_run: bool,
    mode: RunMode,
}

impl Policy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        username: String,
        constraint: Constraint,
        value_max: f64,
        order_by: JobProperty,
        interval: Duration,
        total_duration: Duration,
        dry_run: bool,
        mode: RunMode,
    ) -> crate::Result<Self> {
        if username.trim().is_empty() {
            return Err(HolderError::ConfigurationError(
                "username must not be empty".to_string(),
            ));
        }
        if !value_max.is_finite() || value_max < 0.0 {
            return Err(HolderError::ConfigurationError(format!(
                "maximum value must be a non-negative number, got {value_max}"
            )));
        }
        if interval.is_zero() {
            return Err(HolderError::ConfigurationError(
                "interval must be positive".to_string(),
            ));
        }
        if total_duration.is_zero() {
            return Err(HolderError::ConfigurationError(
                "duration must be positive".to_string(),
            ));
        }
        Ok(Self {
            username,
            constraint,
            value_max,
            order_by,
            interval,
            total_duration,
            dry_run,
            mode,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn constraint(&self) -> Constraint {
        self.constraint
    }

    pub fn value_max(&self) -> f64 {
        self.value_max
    }

    pub fn order_by(&self) -> JobProperty {
        self.order_by
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::common::error::HolderError;
    use crate::holder::config::{Constraint, Policy, RunMode};
    use crate::holder::job::JobProperty;

    fn policy(value_max: f64, interval: u64, duration: u64) -> crate::Result<Policy> {
        Policy::new(
            "user".to_string(),
            Constraint::Nodes,
            value_max,
            JobProperty::SubmitTime,
            Duration::from_secs(interval),
            Duration::from_secs(duration),
            false,
            RunMode::Daemon,
        )
    }

    #[test]
    fn valid_policy() {
        let policy = policy(12.0, 5, 60).unwrap();
        assert_eq!(policy.value_max(), 12.0);
        assert_eq!(policy.interval(), Duration::from_secs(5));
        assert_eq!(policy.total_duration(), Duration::from_secs(60));
        assert_eq!(policy.constraint(), Constraint::Nodes);
        assert_eq!(policy.order_by(), JobProperty::SubmitTime);
        assert_eq!(policy.mode(), RunMode::Daemon);
        assert!(!policy.dry_run());
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(matches!(
            policy(12.0, 0, 60),
            Err(HolderError::ConfigurationError(_))
        ));
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(matches!(
            policy(12.0, 5, 0),
            Err(HolderError::ConfigurationError(_))
        ));
    }

    #[test]
    fn invalid_value_max_is_rejected() {
        for value in [f64::NAN, f64::INFINITY, -1.0] {
            assert!(matches!(
                policy(value, 5, 60),
                Err(HolderError::ConfigurationError(_))
            ));
        }
    }

    #[test]
    fn empty_username_is_rejected() {
        let result = Policy::new(
            " ".to_string(),
            Constraint::Nodes,
            1.0,
            JobProperty::SubmitTime,
            Duration::from_secs(1),
            Duration::from_secs(1),
            false,
            RunMode::SingleShot,
        );
        assert!(matches!(result, Err(HolderError::ConfigurationError(_))));
    }
}
