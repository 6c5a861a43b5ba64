use chrono::NaiveDateTime;
use event_sessions_domain::{count_occurrences, CountOptions, RecurrenceError, RecurrenceRule};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How many sessions the edited rule is going to produce
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum OccurrencePreview {
    Count(usize),
    /// Too many to count, see `CountOptions::max_span_years`
    VeryLarge,
    /// The rule never ends or is not complete yet
    Unknown,
}

impl OccurrencePreview {
    pub fn compute(rule: &RecurrenceRule, start: NaiveDateTime, options: &CountOptions) -> Self {
        match count_occurrences(rule, start, options) {
            Ok(count) => Self::Count(count),
            Err(RecurrenceError::UnboundedSpan { .. }) => Self::VeryLarge,
            Err(e) => {
                debug!("Unable to count occurrences: {}", e);
                Self::Unknown
            }
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            Self::Count(count) => Some(*count),
            _ => None,
        }
    }

    /// Whether the host should warn about the number of sessions
    pub fn is_large(&self, threshold: usize) -> bool {
        match self {
            Self::Count(count) => *count > threshold,
            Self::VeryLarge => true,
            Self::Unknown => false,
        }
    }
}
