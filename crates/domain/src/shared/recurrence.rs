use super::weekday::WeekDay;
use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt::Display};
use thiserror::Error;

/// Number of occurrences a rule gets when nothing else is supplied
pub const DEFAULT_COUNT: u32 = 10;

const RRULE_PREFIX: &str = "RRULE:";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RRuleFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl RRuleFrequency {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }
}

/// When a recurrence stops producing occurrences.
/// `Until` is inclusive on the calendar date.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum RecurrenceEnd {
    Never,
    Count(u32),
    Until(NaiveDate),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecurrenceError {
    #[error("Invalid recurrence rule syntax: {0}")]
    InvalidRuleSyntax(String),
    #[error("Occurrences can not be counted: {0}")]
    DegenerateCount(String),
    #[error("Recurrence spans more than {years} years")]
    UnboundedSpan { years: u32 },
}

/// Validated recurrence rule.
///
/// The start date is owned by the event the rule belongs to, so it is
/// passed alongside the rule wherever it matters instead of being stored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    frequency: RRuleFrequency,
    interval: u32,
    weekdays: BTreeSet<WeekDay>,
    end: RecurrenceEnd,
}

impl RecurrenceRule {
    /// Builds a rule anchored at `start`.
    ///
    /// A non-positive `interval` is clamped to 1. For weekly rules an empty
    /// weekday selection becomes the weekday of `start`; for other
    /// frequencies the selection is dropped.
    pub fn new(
        frequency: RRuleFrequency,
        interval: i64,
        weekdays: impl IntoIterator<Item = WeekDay>,
        end: RecurrenceEnd,
        start: &NaiveDateTime,
    ) -> Self {
        let interval = clamp_interval(interval);
        let weekdays = match frequency {
            RRuleFrequency::Weekly => {
                let mut weekdays = weekdays.into_iter().collect::<BTreeSet<_>>();
                if weekdays.is_empty() {
                    weekdays.insert(WeekDay::of(&start.date()));
                }
                weekdays
            }
            _ => BTreeSet::new(),
        };

        Self {
            frequency,
            interval,
            weekdays,
            end,
        }
    }

    /// Weekly, every week on the weekday of `start`, ten times
    pub fn default_for(start: &NaiveDateTime) -> Self {
        Self::new(
            RRuleFrequency::Weekly,
            1,
            None,
            RecurrenceEnd::Count(DEFAULT_COUNT),
            start,
        )
    }

    pub fn frequency(&self) -> RRuleFrequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Selected weekdays, ascending. Empty unless the rule is weekly.
    pub fn weekdays(&self) -> &BTreeSet<WeekDay> {
        &self.weekdays
    }

    pub fn end(&self) -> RecurrenceEnd {
        self.end
    }

    /// Parses the canonical `KEY=VALUE;...` form.
    ///
    /// Unknown keys are ignored. A missing `INTERVAL` means 1 and a weekly
    /// rule without `BYDAY` repeats on the weekday of `start`.
    pub fn parse(serialized: &str, start: &NaiveDateTime) -> Result<Self, RecurrenceError> {
        let mut body = serialized.trim();
        if let Some(prefix) = body.get(..RRULE_PREFIX.len()) {
            if prefix.eq_ignore_ascii_case(RRULE_PREFIX) {
                body = &body[RRULE_PREFIX.len()..];
            }
        }

        let mut frequency = None;
        let mut interval = 1;
        let mut weekdays = Vec::new();
        let mut end = RecurrenceEnd::Never;

        for token in body.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            let (key, value) = match token.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => (key.trim(), value.trim()),
                _ => {
                    return Err(RecurrenceError::InvalidRuleSyntax(format!(
                        "`{}` is not a KEY=VALUE pair",
                        token
                    )))
                }
            };

            match key.to_uppercase().as_str() {
                "FREQ" => frequency = Some(parse_frequency(value)?),
                "INTERVAL" => interval = parse_number::<i64>(key, value)?,
                "BYDAY" => weekdays = parse_weekdays(value)?,
                "COUNT" => {
                    let count = parse_number::<i64>(key, value)?;
                    if count <= 0 || count > u32::MAX as i64 {
                        return Err(RecurrenceError::InvalidRuleSyntax(format!(
                            "COUNT must be a positive number, got `{}`",
                            value
                        )));
                    }
                    end = RecurrenceEnd::Count(count as u32);
                }
                "UNTIL" => end = RecurrenceEnd::Until(parse_until(value)?),
                _ => (),
            }
        }

        let frequency = frequency.ok_or_else(|| {
            RecurrenceError::InvalidRuleSyntax(format!("`{}` has no FREQ", serialized))
        })?;

        Ok(Self::new(frequency, interval, weekdays, end, start))
    }
}

/// Canonical serialization. Field order is fixed:
/// `FREQ`, `INTERVAL`, `BYDAY` (weekly only), then `COUNT` or `UNTIL`.
impl Display for RecurrenceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FREQ={};INTERVAL={}",
            self.frequency.as_str(),
            self.interval
        )?;
        if self.frequency == RRuleFrequency::Weekly && !self.weekdays.is_empty() {
            write!(f, ";BYDAY={}", self.weekdays.iter().join(","))?;
        }
        match self.end {
            RecurrenceEnd::Never => Ok(()),
            RecurrenceEnd::Count(count) => write!(f, ";COUNT={}", count),
            RecurrenceEnd::Until(until) => write!(f, ";UNTIL={}", until.format("%Y-%m-%d")),
        }
    }
}

fn clamp_interval(interval: i64) -> u32 {
    interval.clamp(1, u32::MAX as i64) as u32
}

fn parse_frequency(value: &str) -> Result<RRuleFrequency, RecurrenceError> {
    match value.to_uppercase().as_str() {
        "DAILY" => Ok(RRuleFrequency::Daily),
        "WEEKLY" => Ok(RRuleFrequency::Weekly),
        "MONTHLY" => Ok(RRuleFrequency::Monthly),
        _ => Err(RecurrenceError::InvalidRuleSyntax(format!(
            "Unsupported FREQ: `{}`",
            value
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, RecurrenceError> {
    value.parse::<T>().map_err(|_| {
        RecurrenceError::InvalidRuleSyntax(format!("{} must be a number, got `{}`", key, value))
    })
}

fn parse_weekdays(value: &str) -> Result<Vec<WeekDay>, RecurrenceError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            d.parse::<WeekDay>()
                .map_err(|e| RecurrenceError::InvalidRuleSyntax(e.to_string()))
        })
        .collect()
}

/// Accepts `YYYY-MM-DD` as well as the iCalendar basic forms
/// `YYYYMMDD` and `YYYYMMDDTHHMMSS[Z]`. Only the date part is kept.
fn parse_until(value: &str) -> Result<NaiveDate, RecurrenceError> {
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y%m%d"))
        .map_err(|_| {
            RecurrenceError::InvalidRuleSyntax(format!("UNTIL is not a valid date: `{}`", value))
        })
}
