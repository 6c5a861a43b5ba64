use chrono::{NaiveDate, NaiveDateTime};
use event_sessions_domain::{
    RRuleFrequency, RecurrenceEnd, RecurrenceError, RecurrenceRule, WeekDay,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndCondition {
    Never,
    Count,
    Until,
}

/// Form state of the rule editor.
///
/// Unlike `RecurrenceRule` this may be invalid while the user is typing,
/// e.g. `end_condition` is `Count` but the count input is empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableRuleState {
    pub frequency: RRuleFrequency,
    pub interval: Option<i64>,
    pub weekdays: BTreeSet<WeekDay>,
    pub end_condition: EndCondition,
    pub count: Option<i64>,
    pub until: Option<NaiveDate>,
}

impl EditableRuleState {
    /// Mirrors `rule` as it applies from `start`.
    ///
    /// A weekly selection that is just the weekday of `start` is kept empty,
    /// so that it follows the start when the event is moved.
    pub fn from_rule(rule: &RecurrenceRule, start: &NaiveDateTime) -> Self {
        let (end_condition, count, until) = match rule.end() {
            RecurrenceEnd::Never => (EndCondition::Never, None, None),
            RecurrenceEnd::Count(count) => (EndCondition::Count, Some(count as i64), None),
            RecurrenceEnd::Until(until) => (EndCondition::Until, None, Some(until)),
        };
        let follows_start = rule.weekdays().len() == 1
            && rule.weekdays().contains(&WeekDay::of(&start.date()));
        let weekdays = if follows_start {
            BTreeSet::new()
        } else {
            rule.weekdays().clone()
        };
        Self {
            frequency: rule.frequency(),
            interval: Some(rule.interval() as i64),
            weekdays,
            end_condition,
            count,
            until,
        }
    }

    pub fn set_end_condition(&mut self, end_condition: EndCondition) {
        self.end_condition = end_condition;
        match end_condition {
            EndCondition::Never => {
                self.count = None;
                self.until = None;
            }
            EndCondition::Count => self.until = None,
            EndCondition::Until => self.count = None,
        }
    }

    /// Switches to a count based end and clears any until date
    pub fn set_count(&mut self, count: Option<i64>) {
        self.set_end_condition(EndCondition::Count);
        self.count = count;
    }

    /// Switches to a date based end and clears any count
    pub fn set_until(&mut self, until: Option<NaiveDate>) {
        self.set_end_condition(EndCondition::Until);
        self.until = until;
    }

    /// Adds the weekday if it is not selected, removes it otherwise
    pub fn toggle_weekday(&mut self, weekday: WeekDay) {
        if !self.weekdays.remove(&weekday) {
            self.weekdays.insert(weekday);
        }
    }

    /// Turns the form state into a valid rule anchored at `start`.
    ///
    /// Fails with `DegenerateCount` while the selected end condition is
    /// missing its value.
    pub fn reconcile(&self, start: &NaiveDateTime) -> Result<RecurrenceRule, RecurrenceError> {
        let end = match self.end_condition {
            EndCondition::Never => RecurrenceEnd::Never,
            EndCondition::Count => match self.count {
                Some(count) if count > 0 && count <= u32::MAX as i64 => {
                    RecurrenceEnd::Count(count as u32)
                }
                _ => {
                    return Err(RecurrenceError::DegenerateCount(format!(
                        "count must be a positive number, got {:?}",
                        self.count
                    )))
                }
            },
            EndCondition::Until => match self.until {
                Some(until) => RecurrenceEnd::Until(until),
                None => {
                    return Err(RecurrenceError::DegenerateCount(
                        "no until date selected".into(),
                    ))
                }
            },
        };

        Ok(RecurrenceRule::new(
            self.frequency,
            self.interval.unwrap_or(1),
            self.weekdays.iter().copied(),
            end,
            start,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn state(rule: &str) -> EditableRuleState {
        EditableRuleState::from_rule(&RecurrenceRule::parse(rule, &start()).unwrap(), &start())
    }

    #[test]
    fn mirrors_the_rule() {
        let state = state("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,TH;UNTIL=2024-05-01");
        assert_eq!(state.frequency, RRuleFrequency::Weekly);
        assert_eq!(state.interval, Some(2));
        assert_eq!(state.weekdays.len(), 2);
        assert_eq!(state.end_condition, EndCondition::Until);
        assert_eq!(state.count, None);
        assert_eq!(state.until, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn count_and_until_clear_each_other() {
        let mut state = state("FREQ=DAILY;COUNT=5");
        state.set_until(NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(state.count, None);
        assert_eq!(state.end_condition, EndCondition::Until);

        state.set_count(Some(3));
        assert_eq!(state.until, None);
        assert_eq!(state.end_condition, EndCondition::Count);

        state.set_end_condition(EndCondition::Never);
        assert_eq!(state.count, None);
        assert_eq!(state.until, None);
    }

    #[test]
    fn reconciles_transient_values() {
        let mut state = state("FREQ=DAILY;COUNT=5");
        state.interval = None;
        assert_eq!(
            state.reconcile(&start()).unwrap().to_string(),
            "FREQ=DAILY;INTERVAL=1;COUNT=5"
        );

        state.interval = Some(-3);
        assert_eq!(state.reconcile(&start()).unwrap().interval(), 1);
    }

    #[test]
    fn incomplete_end_condition_is_degenerate() {
        let mut state = state("FREQ=DAILY;COUNT=5");
        for count in &[None, Some(0), Some(-1)] {
            state.set_count(*count);
            assert!(matches!(
                state.reconcile(&start()),
                Err(RecurrenceError::DegenerateCount(_))
            ));
        }
        state.set_until(None);
        assert!(matches!(
            state.reconcile(&start()),
            Err(RecurrenceError::DegenerateCount(_))
        ));
    }

    #[test]
    fn start_weekday_selection_follows_the_start() {
        // 2024-01-02 is a Tuesday
        let single = state("FREQ=WEEKLY;BYDAY=TU;COUNT=3");
        assert!(single.weekdays.is_empty());
        let friday = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(
            single.reconcile(&friday).unwrap().to_string(),
            "FREQ=WEEKLY;INTERVAL=1;BYDAY=FR;COUNT=3"
        );

        let several = state("FREQ=WEEKLY;BYDAY=TU,FR;COUNT=3");
        assert_eq!(
            several.reconcile(&friday).unwrap().to_string(),
            "FREQ=WEEKLY;INTERVAL=1;BYDAY=TU,FR;COUNT=3"
        );
    }

    #[test]
    fn deselecting_every_weekday_falls_back_to_start_weekday() {
        let mut state = state("FREQ=WEEKLY;BYDAY=FR;COUNT=2");
        state.toggle_weekday("FR".parse().unwrap());
        assert!(state.weekdays.is_empty());
        assert_eq!(
            state.reconcile(&start()).unwrap().to_string(),
            "FREQ=WEEKLY;INTERVAL=1;BYDAY=TU;COUNT=2"
        );
    }
}
