//! Blame output parser.
//!
//! Expects `git blame -f -n` style lines:
//! `<hash> <path> <orig_line> (<author> <YYYY-MM-DD HH:MM:SS ±HHHH> <line>) <content>`
//!
//! Example: `^1a2b3c4 src/main.rs 12 (Jane Doe 2021-03-04 05:06:07 +0100 14) fn main() {`
//!
//! Every matching line yields a line record, so line records stay aligned
//! with the file's physical lines.

use chrono::{DateTime, FixedOffset, Months, NaiveDate, TimeDelta, TimeZone};
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use crate::models::{BlameResult, CommitRecord, LineRecord};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// One capture each: hash, path, original line, author, timestamp, current line
static BLAME_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^([\^0-9a-fA-F]{8})\s+(\S+)\s+(\d+) \((.+?) (\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} [+-]\d{4})\s+(\d+)\).*$",
    )
    .expect("Invalid blame line regex")
});

/// Parse raw blame text into commits and ordered line records.
///
/// Lines that do not match are skipped. The first line seen for a hash
/// provides its commit record.
pub fn parse_blame(text: &str) -> BlameResult {
    let mut commits: HashMap<String, CommitRecord> = HashMap::new();
    let mut lines = Vec::new();

    for caps in BLAME_LINE_REGEX.captures_iter(text) {
        let Some((commit, line)) = parse_captures(&caps) else {
            continue;
        };
        commits.entry(line.hash.clone()).or_insert(commit);
        lines.push(line);
    }

    BlameResult { commits, lines }
}

fn parse_captures(caps: &regex::Captures<'_>) -> Option<(CommitRecord, LineRecord)> {
    let hash = caps.get(1)?.as_str();
    let file_name = caps.get(2)?.as_str();
    let original_line = to_zero_based(caps.get(3)?.as_str());
    // blame pads the author column to its widest name
    let author = caps.get(4)?.as_str().trim_end();
    let date = parse_timestamp(caps.get(5)?.as_str());
    let current_line = to_zero_based(caps.get(6)?.as_str());

    let commit = CommitRecord {
        hash: hash.to_string(),
        file_name: file_name.to_string(),
        author: author.to_string(),
        date,
    };
    let line = LineRecord {
        hash: hash.to_string(),
        original_line,
        current_line,
    };
    Some((commit, line))
}

/// Blame numbers lines from 1. A 0 stays 0; only overflow fails to parse.
fn to_zero_based(number: &str) -> usize {
    number
        .parse::<usize>()
        .map_or(usize::MAX, |n| n.saturating_sub(1))
}

/// Out-of-range fields (`2020-02-30`, `25:00:00`) roll over into the next
/// unit instead of rejecting the line.
fn parse_timestamp(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| roll_over_timestamp(raw))
        .unwrap_or_default()
}

fn roll_over_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let field = |range: Range<usize>| -> Option<i64> { raw.get(range)?.parse().ok() };

    let (year, month, day) = (field(0..4)?, field(5..7)?, field(8..10)?);
    let (hour, minute, second) = (field(11..13)?, field(14..16)?, field(17..19)?);
    let sign = if raw.get(20..21)? == "-" { -1 } else { 1 };
    let offset_secs = sign * (field(21..23)? * 3600 + field(23..25)? * 60);
    let offset = FixedOffset::east_opt(offset_secs as i32).or_else(|| FixedOffset::east_opt(0))?;

    let january = NaiveDate::from_ymd_opt(year as i32, 1, 1)?;
    let first_of_month = if month >= 1 {
        january.checked_add_months(Months::new((month - 1) as u32))?
    } else {
        january.checked_sub_months(Months::new(1))?
    };
    let naive = first_of_month.and_hms_opt(0, 0, 0)?
        + TimeDelta::days(day - 1)
        + TimeDelta::hours(hour)
        + TimeDelta::minutes(minute)
        + TimeDelta::seconds(second);

    offset.from_local_datetime(&naive).single()
}
