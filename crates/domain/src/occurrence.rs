use crate::shared::recurrence::{RRuleFrequency, RecurrenceEnd, RecurrenceError, RecurrenceRule};
use chrono::{Datelike, Days, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound for a single `generate` call. Every expansion is capped by
/// `limit`, also for rules that never end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OccurrenceBound {
    /// Maximum number of occurrences emitted
    pub limit: usize,
    /// Occurrences after this point in time are not emitted
    pub window_end: Option<NaiveDateTime>,
}

impl OccurrenceBound {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            window_end: None,
        }
    }

    pub fn until(mut self, window_end: NaiveDateTime) -> Self {
        self.window_end = Some(window_end);
        self
    }
}

/// Guards for `count_occurrences`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountOptions {
    /// An `UNTIL` further than this many years after the start is not counted
    pub max_span_years: u32,
    /// Hard cap on iterations while counting
    pub max_occurrences: usize,
}

impl Default for CountOptions {
    fn default() -> Self {
        Self {
            max_span_years: 5,
            max_occurrences: 10_000,
        }
    }
}

/// Lazily expands a rule from `start`.
///
/// Each call starts from scratch, the returned iterator owns everything
/// it needs.
///
/// Monthly rules keep the day of month of `start` and clamp it to the last
/// day of shorter months (Jan 31, Feb 29, Mar 31). RFC 5545 skips those
/// months instead.
pub fn generate(rule: &RecurrenceRule, start: NaiveDateTime, bound: OccurrenceBound) -> Occurrences {
    let weekday_offsets = rule
        .weekdays()
        .iter()
        .map(|wday| wday.weekday() as u64)
        .collect();

    Occurrences {
        frequency: rule.frequency(),
        interval: rule.interval() as u64,
        weekday_offsets,
        end: rule.end(),
        start,
        start_offset: start.weekday().num_days_from_monday() as u64,
        bound,
        period: 0,
        position: 0,
        emitted: 0,
        done: false,
    }
}

/// Number of occurrences a rule produces from `start`.
///
/// `COUNT` rules are answered without iterating. `UNTIL` rules spanning
/// more than `options.max_span_years` are refused with `UnboundedSpan`,
/// and rules that never end with `DegenerateCount`.
#[tracing::instrument(name = "Counting occurrences", skip(rule, options), fields(rule = %rule))]
pub fn count_occurrences(
    rule: &RecurrenceRule,
    start: NaiveDateTime,
    options: &CountOptions,
) -> Result<usize, RecurrenceError> {
    match rule.end() {
        RecurrenceEnd::Count(count) => Ok(count as usize),
        RecurrenceEnd::Never => Err(RecurrenceError::DegenerateCount(
            "the rule never ends, a window is needed".into(),
        )),
        RecurrenceEnd::Until(until) => {
            let unbounded = RecurrenceError::UnboundedSpan {
                years: options.max_span_years,
            };
            let span_end = start
                .date()
                .checked_add_months(Months::new(options.max_span_years.saturating_mul(12)));
            match span_end {
                Some(span_end) if until <= span_end => (),
                _ => {
                    debug!("Until {} is too far away, not counting", until);
                    return Err(unbounded);
                }
            }

            let count = generate(
                rule,
                start,
                OccurrenceBound::new(options.max_occurrences.saturating_add(1)),
            )
            .count();
            if count > options.max_occurrences {
                debug!("Hit the occurrence cap of {}", options.max_occurrences);
                return Err(unbounded);
            }
            Ok(count)
        }
    }
}

/// Iterator returned by `generate`
#[derive(Clone, Debug)]
pub struct Occurrences {
    frequency: RRuleFrequency,
    interval: u64,
    weekday_offsets: Vec<u64>,
    end: RecurrenceEnd,
    start: NaiveDateTime,
    /// Days between the Monday of the first week and `start`
    start_offset: u64,
    bound: OccurrenceBound,
    period: u64,
    /// Index into `weekday_offsets` within the current weekly period
    position: usize,
    emitted: usize,
    done: bool,
}

impl Occurrences {
    /// Next candidate regardless of end conditions. `Some(None)` is a
    /// weekday before `start` in the first week, `None` means date
    /// arithmetic overflowed.
    fn next_candidate(&mut self) -> Option<Option<NaiveDateTime>> {
        let steps = self.period.checked_mul(self.interval)?;
        match self.frequency {
            RRuleFrequency::Daily => {
                self.period += 1;
                self.start.checked_add_days(Days::new(steps)).map(Some)
            }
            RRuleFrequency::Monthly => {
                self.period += 1;
                let months = u32::try_from(steps).ok()?;
                // Computed from `start` every time so that a clamped
                // day-of-month (31st -> 28th) does not stick.
                self.start.checked_add_months(Months::new(months)).map(Some)
            }
            RRuleFrequency::Weekly => {
                let offset = *self.weekday_offsets.get(self.position)?;
                self.position += 1;
                if self.position >= self.weekday_offsets.len() {
                    self.position = 0;
                    self.period += 1;
                }
                // Counted from `start` so that nothing before it is ever computed
                let days = steps.checked_mul(7)?.checked_add(offset)?;
                match days.checked_sub(self.start_offset) {
                    Some(days) => self.start.checked_add_days(Days::new(days)).map(Some),
                    None => Some(None),
                }
            }
        }
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let limit_reached = self.emitted >= self.bound.limit;
            let count_reached = match self.end {
                RecurrenceEnd::Count(count) => self.emitted >= count as usize,
                _ => false,
            };
            if limit_reached || count_reached {
                self.done = true;
                return None;
            }

            let candidate = match self.next_candidate() {
                Some(Some(candidate)) => candidate,
                Some(None) => continue,
                None => {
                    self.done = true;
                    return None;
                }
            };

            let past_until = match self.end {
                RecurrenceEnd::Until(until) => candidate.date() > until,
                _ => false,
            };
            let past_window = match self.bound.window_end {
                Some(window_end) => candidate > window_end,
                None => false,
            };
            if past_until || past_window {
                self.done = true;
                return None;
            }

            self.emitted += 1;
            return Some(candidate);
        }
    }
}
