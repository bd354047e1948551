use std::time::Duration;

use clap::Parser;

use crate::common::manager::slurm::parse_slurm_duration;
use crate::common::utils::time::parse_hms_or_human_time;
use crate::holder::config::{Constraint, DEFAULT_VALUE_MAX, Policy, RunMode};
use crate::holder::job::JobProperty;

/// Accepts `[D-][[HH:]MM:]SS` or humantime format (`30s`, `2h`, `365days`).
fn parse_duration_arg(text: &str) -> anyhow::Result<Duration> {
    parse_slurm_duration(text).or_else(|_| parse_hms_or_human_time(text))
}

/// Holds and releases pending Slurm jobs so that the resources used by running jobs stay
/// under a ceiling.
#[derive(Parser, Debug)]
#[command(author, about, version(crate::JOBHOLDER_VERSION), help_expected(true))]
pub struct HolderOpts {
    /// Ceiling of the constrained value
    #[arg(short = 'v', long, env = "JOBHOLDER_VALUE_MAX", default_value_t = DEFAULT_VALUE_MAX)]
    pub value_max: f64,

    /// Resource summed over running jobs
    #[arg(
        short = 'c',
        long,
        env = "JOBHOLDER_CONSTRAINT",
        value_enum,
        default_value_t = Constraint::Nodes
    )]
    pub constraint: Constraint,

    /// Job property used to order pending jobs, highest value first
    #[arg(
        short = 'o',
        long,
        env = "JOBHOLDER_ORDER_BY",
        value_enum,
        default_value_t = JobProperty::SubmitTime
    )]
    pub order_by: JobProperty,

    /// Delay between two decision cycles
    ///
    /// Accepts seconds, `[[HH:]MM:]SS` or humantime format (e.g. `30s`).
    #[arg(
        short = 'i',
        long,
        env = "JOBHOLDER_INTERVAL",
        default_value = "5s",
        value_parser = parse_duration_arg
    )]
    pub interval: Duration,

    /// Owner of the managed jobs
    ///
    /// Defaults to `$USER`, or to the output of `whoami`.
    #[arg(long, env = "JOBHOLDER_USERNAME")]
    pub username: Option<String>,

    /// How long the daemon keeps running
    #[arg(
        long,
        env = "JOBHOLDER_DURATION",
        default_value = "365days",
        value_parser = parse_duration_arg
    )]
    pub duration: Duration,

    /// Logging verbosity (0 = errors only, 3 = debug)
    #[arg(
        long,
        env = "JOBHOLDER_VERBOSE",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=3)
    )]
    pub verbose: u8,

    /// Only log the actions that would be performed
    #[arg(long, env = "JOBHOLDER_DRY_RUN")]
    pub dry_run: bool,

    /// Run a single decision cycle and exit
    #[arg(long, env = "JOBHOLDER_NO_DAEMON")]
    pub no_daemon: bool,
}

impl HolderOpts {
    pub fn into_policy(self) -> crate::Result<Policy> {
        let username = match self.username {
            Some(username) => username,
            None => detect_username()?,
        };
        let mode = if self.no_daemon {
            RunMode::SingleShot
        } else {
            RunMode::Daemon
        };
        Policy::new(
            username,
            self.constraint,
            self.value_max,
            self.order_by,
            self.interval,
            self.duration,
            self.dry_run,
            mode,
        )
    }
}

fn detect_username() -> crate::Result<String> {
    if let Ok(user) = std::env::var("USER") {
        if !user.trim().is_empty() {
            return Ok(user.trim().to_string());
        }
    }
    let output = std::process::Command::new("whoami").output()?;
    if !output.status.success() {
        return Err(crate::Error::ConfigurationError(format!(
            "cannot determine username, `whoami` exited with {}",
            output.status
        )));
    }
    let user = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if user.is_empty() {
        return Err(crate::Error::ConfigurationError(
            "cannot determine username, pass it with --username".to_string(),
        ));
    }
    Ok(user)
}
