use std::time::Duration;

use anyhow::anyhow;
use nom::Parser;
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::sequence::{pair, preceded};
use nom_supreme::ParserExt;

use crate::common::parser::{NomResult, consume_all, p_u32};

/// The number of `:` separated parts decides the meaning: one part is seconds, two parts are
/// minutes and seconds, three parts are hours, minutes and seconds.
pub(crate) fn p_hms_time(input: &str) -> NomResult<Duration> {
    map(
        pair(
            p_u32,
            opt(pair(
                preceded(char(':'), p_u32),
                opt(preceded(char(':'), p_u32)),
            )),
        )
        .context("[[HH:]MM:]SS value"),
        |parsed| match parsed {
            (seconds, None) => Duration::from_secs(seconds as u64),
            (minutes, Some((seconds, None))) => {
                Duration::from_secs(minutes as u64 * 60 + seconds as u64)
            }
            (hours, Some((minutes, Some(seconds)))) => Duration::from_secs(
                hours as u64 * 3600 + minutes as u64 * 60 + seconds as u64,
            ),
        },
    )
    .parse(input)
}

/// Parses `SS`, `MM:SS` or `HH:MM:SS`; each part may be zero padded (`02:03:04`).
pub fn parse_hms_time(input: &str) -> anyhow::Result<Duration> {
    consume_all(p_hms_time, input)
}

/// Accepts either `[[HH:]MM:]SS` or humantime format (`30s`, `2h`, `365days`).
pub fn parse_hms_or_human_time(text: &str) -> anyhow::Result<Duration> {
    parse_hms_time(text)
        .or_else(|_| humantime::parse_duration(text))
        .map_err(|e| {
            anyhow!("Could not parse duration. Use either `HH:MM:SS` or humantime format (2hours): {e:?}")
        })
}
