use std::time::Duration;

use nom::Parser;
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::sequence::{pair, terminated};

use crate::common::error::HolderError;
use crate::common::parser::{NomResult, consume_all, find_first, p_decimal, p_u32};
use crate::common::utils::time::p_hms_time;

/// Columns requested from `squeue --Format`, in the order in which job records are parsed.
pub const SQUEUE_FIELDS: [&str; 12] = [
    "JobID",
    "Name",
    "State",
    "SubmitTime",
    "Partition",
    "TimeLimit",
    "NumNodes",
    "NumCPUs",
    "MinMemory",
    "TimeLeft",
    "Priority",
    "ReasonList",
];

/// Reason reported by Slurm for jobs held with `scontrol hold`.
pub const JOB_HELD_USER_REASON: &str = "JobHeldUser";

/// Formats a duration the way Slurm prints time limits, e.g. `01:05:02` or `2-01:05:02`.
pub fn format_slurm_duration(duration: &Duration) -> String {
    let total = duration.as_secs();
    let (days, rest) = (total / 86400, total % 86400);
    let hms = format!("{:02}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => hms,
        days => format!("{days}-{hms}"),
    }
}

pub fn parse_slurm_datetime(datetime: &str) -> anyhow::Result<chrono::NaiveDateTime> {
    Ok(chrono::NaiveDateTime::parse_from_str(
        datetime,
        "%Y-%m-%dT%H:%M:%S",
    )?)
}

fn p_slurm_duration(input: &str) -> NomResult<Duration> {
    map(
        pair(opt(terminated(p_u32, char('-'))), p_hms_time),
        |(days, time)| Duration::from_secs(days.unwrap_or(0) as u64 * 86400) + time,
    )
    .parse(input)
}

/// Parses Slurm durations (`TimeLimit`, `TimeLeft`) in the formats `D-HH:MM:SS`, `HH:MM:SS`,
/// `MM:SS` and `SS`.
pub fn parse_slurm_duration(value: &str) -> crate::Result<Duration> {
    consume_all(p_slurm_duration, value.trim()).map_err(|error| HolderError::MalformedDuration {
        value: value.to_string(),
        reason: error.to_string(),
    })
}

/// Returns the first (optionally signed and decimal) number found in a memory string such as
/// `16000M` or `16.5G`. The unit suffix is ignored.
pub fn parse_slurm_memory(value: &str) -> crate::Result<f64> {
    find_first(p_decimal, value).ok_or_else(|| HolderError::MalformedResource(value.to_string()))
}

/// Reads the fairshare score from the output of `sshare -u <user> -U`.
/// The score is the last column of the last line.
pub fn parse_sshare_fairshare(output: &str) -> anyhow::Result<f64> {
    let line = output
        .lines()
        .map(|line| line.trim())
        .rfind(|line| !line.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Empty sshare output"))?;
    let value = line
        .split_whitespace()
        .last()
        .ok_or_else(|| anyhow::anyhow!("Missing fairshare column in sshare output"))?;
    value
        .parse::<f64>()
        .map_err(|error| anyhow::anyhow!("Cannot parse fairshare value `{value}`: {error}"))
}
