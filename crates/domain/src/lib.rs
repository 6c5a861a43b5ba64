mod occurrence;
mod session;
mod shared;

pub use occurrence::{count_occurrences, generate, CountOptions, OccurrenceBound, Occurrences};
pub use session::{expand_sessions, SessionInstance};
pub use shared::recurrence::{
    RRuleFrequency, RecurrenceEnd, RecurrenceError, RecurrenceRule, DEFAULT_COUNT,
};
pub use shared::weekday::{to_calendar_day, to_rule_day, InvalidWeekDayError, WeekDay};
