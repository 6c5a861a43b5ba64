use chrono::{NaiveDate, NaiveDateTime};

pub fn datetime(date: &str, hours: u32, minutes: u32) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%F")
        .expect("Expected a YYYY-MM-DD date")
        .and_hms_opt(hours, minutes, 0)
        .expect("Expected a valid time")
}
