use chrono::{Datelike, NaiveDate, Weekday};
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

const DAYS_IN_WEEK: i64 = 7;

/// Converts a calendar-convention weekday (Sunday=0 ... Saturday=6) to the
/// rule convention (Monday=0 ... Sunday=6). Input is taken modulo 7.
pub fn to_rule_day(calendar_day: i64) -> usize {
    (calendar_day - 1).rem_euclid(DAYS_IN_WEEK) as usize
}

/// Converts a rule-convention weekday (Monday=0 ... Sunday=6) to the
/// calendar convention (Sunday=0 ... Saturday=6). Input is taken modulo 7.
pub fn to_calendar_day(rule_day: i64) -> usize {
    (rule_day + 1).rem_euclid(DAYS_IN_WEEK) as usize
}

/// A weekday in the rule convention, where Monday is 0 and Sunday is 6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekDay {
    weekday: usize,
}

impl WeekDay {
    pub fn new(weekday: usize) -> Result<Self, InvalidWeekDayError> {
        if !Self::is_valid_weekday(weekday) {
            return Err(InvalidWeekDayError::OutOfRange(weekday));
        }
        Ok(Self { weekday })
    }

    /// Weekday picked from a calendar widget toggle (Sunday=0 ... Saturday=6)
    pub fn from_calendar_day(calendar_day: i64) -> Self {
        Self {
            weekday: to_rule_day(calendar_day),
        }
    }

    pub fn of(date: &NaiveDate) -> Self {
        Self::from(date.weekday())
    }

    pub fn weekday(&self) -> usize {
        self.weekday
    }

    pub fn calendar_day(&self) -> usize {
        to_calendar_day(self.weekday as i64)
    }

    fn is_valid_weekday(wday: usize) -> bool {
        wday <= 6
    }
}

impl From<Weekday> for WeekDay {
    fn from(wday: Weekday) -> Self {
        Self {
            weekday: wday.num_days_from_monday() as usize,
        }
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", weekday_to_str(self.weekday))
    }
}

fn str_to_weekday(d: &str) -> Result<usize, InvalidWeekDayError> {
    match d.to_uppercase().as_str() {
        "MO" => Ok(0),
        "TU" => Ok(1),
        "WE" => Ok(2),
        "TH" => Ok(3),
        "FR" => Ok(4),
        "SA" => Ok(5),
        "SU" => Ok(6),
        _ => Err(InvalidWeekDayError::InvalidWeekdayIdentifier(d.to_string())),
    }
}

fn weekday_to_str(wday: usize) -> &'static str {
    match wday {
        0 => "MO",
        1 => "TU",
        2 => "WE",
        3 => "TH",
        4 => "FR",
        5 => "SA",
        _ => "SU",
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidWeekDayError {
    #[error("Invalid weekday specified: {0}")]
    InvalidWeekdayIdentifier(String),
    #[error("Weekday index out of range: {0}")]
    OutOfRange(usize),
    #[error("Malformed weekday: {0}")]
    Malformed(String),
}

impl FromStr for WeekDay {
    type Err = InvalidWeekDayError;

    fn from_str(day: &str) -> Result<Self, Self::Err> {
        let day = day.trim();
        // Ordinal prefixes like `1MO` or `-1FR` belong to monthly by-day rules
        // which are not supported.
        if day.len() != 2 {
            return Err(InvalidWeekDayError::Malformed(day.to_string()));
        }
        let wday = str_to_weekday(day)?;
        WeekDay::new(wday)
    }
}

impl Serialize for WeekDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WeekDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct WeekDayVisitor;

        impl<'de> Visitor<'de> for WeekDayVisitor {
            type Value = WeekDay;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A valid string representation of weekday")
            }

            fn visit_str<E>(self, value: &str) -> Result<WeekDay, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<WeekDay>()
                    .map_err(|_| E::custom(format!("Malformed weekday: {}", value)))
            }
        }

        deserializer.deserialize_str(WeekDayVisitor)
    }
}
