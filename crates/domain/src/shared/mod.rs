pub mod recurrence;
pub mod weekday;
