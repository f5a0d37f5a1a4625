//! Decoding of off-hours schedule tags
//!
//! A schedule tag looks like
//!
//! ```text
//! off=[(M-F,21),(U,18)];on=[(M-F,6),(U,10)];tz=pt
//! ```
//!
//! Each state lists `(days,hour)` pairs. Days are the letters `M T W H F S U`, single or
//! as an inclusive range `a-b` that may wrap past the end of the week, and several day
//! groups may be listed with commas, as in `(M,W,F,8)`. Day numbers use Sunday = 0 so that
//! they line up with `getDayOfWeek()` on timestamps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_TZ: &str = "et";
const DAYS_PER_WEEK: u8 = 7;

/// One `(days,hour)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpec {
    pub days: Vec<u8>,
    pub hour: u8,
}

/// A decoded schedule: time specs per state plus the optional timezone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSchedule {
    pub states: BTreeMap<String, Vec<TimeSpec>>,
    pub tz: Option<String>,
}

/// A time spec with the schedule's timezone attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub days: Vec<u8>,
    pub hour: u8,
    pub tz: String,
}

/// Parse a schedule tag value; `None` when any part of it is malformed
#[must_use]
pub fn parse_schedule(text: &str) -> Option<ParsedSchedule> {
    let text = text.trim().to_lowercase();
    let mut schedule = ParsedSchedule::default();

    for part in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, value) = part.split_once('=')?;
        let (name, value) = (name.trim(), value.trim());
        match name {
            "on" | "off" => {
                let _ = schedule.states.insert(name.to_string(), parse_time_specs(value)?);
            }
            "tz" => {
                if !value.is_empty() {
                    schedule.tz = Some(value.to_string());
                }
            }
            _ => return None,
        }
    }

    if schedule.states.is_empty() {
        return None;
    }

    Some(schedule)
}

/// Copy the timezone onto every time spec, defaulting to `et`
#[must_use]
pub fn flatten_schedule(schedule: &ParsedSchedule) -> BTreeMap<String, Vec<ScheduleEntry>> {
    let tz = schedule.tz.as_deref().unwrap_or(DEFAULT_TZ);
    schedule
        .states
        .iter()
        .map(|(state, specs)| {
            let entries = specs
                .iter()
                .map(|spec| ScheduleEntry {
                    days: spec.days.clone(),
                    hour: spec.hour,
                    tz: tz.to_string(),
                })
                .collect();
            (state.clone(), entries)
        })
        .collect()
}

/// `[(a,b),(c,d)]` or a lone `(a,b)`
fn parse_time_specs(value: &str) -> Option<Vec<TimeSpec>> {
    let mut rest = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')).unwrap_or(value).trim();

    let mut specs = Vec::new();
    while !rest.is_empty() {
        let (body, after) = rest.strip_prefix('(')?.split_once(')')?;
        specs.push(parse_time_spec(body)?);
        rest = after.trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma.trim_start();
        }
    }

    if specs.is_empty() {
        return None;
    }

    Some(specs)
}

fn parse_time_spec(body: &str) -> Option<TimeSpec> {
    let (day_groups, hour) = body.rsplit_once(',')?;
    let hour = hour.trim().parse::<u8>().ok().filter(|h| *h < 24)?;

    let mut days = Vec::new();
    for group in day_groups.split(',') {
        days.extend(parse_day_group(group.trim())?);
    }
    days.sort_unstable();
    days.dedup();

    Some(TimeSpec { days, hour })
}

fn parse_day_group(group: &str) -> Option<Vec<u8>> {
    if let Some((start, end)) = group.split_once('-') {
        let start = day_number(start.trim())?;
        let end = day_number(end.trim())?;

        let mut days = vec![start];
        let mut day = start;
        while day != end {
            day = (day + 1) % DAYS_PER_WEEK;
            days.push(day);
        }
        Some(days)
    } else {
        Some(vec![day_number(group)?])
    }
}

fn day_number(letter: &str) -> Option<u8> {
    match letter {
        "u" => Some(0),
        "m" => Some(1),
        "t" => Some(2),
        "w" => Some(3),
        "h" => Some(4),
        "f" => Some(5),
        "s" => Some(6),
        _ => None,
    }
}
