use crate::{
    preview::OccurrencePreview,
    state::{EditableRuleState, EndCondition},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use event_sessions_domain::{
    expand_sessions, OccurrenceBound, RRuleFrequency, RecurrenceRule, SessionInstance, WeekDay,
};
use event_sessions_infra::Config;
use tracing::{debug, warn};

/// Receives the canonical rule string whenever the editor produces a new one.
///
/// This is the seam towards the form that owns the event.
pub trait RuleSubscriber {
    fn notify(&mut self, canonical: &str);
}

impl<F: FnMut(&str)> RuleSubscriber for F {
    fn notify(&mut self, canonical: &str) {
        self(canonical)
    }
}

/// Keeps an `EditableRuleState` and the canonical rule string of the
/// enclosing form in sync, in both directions, and exposes a preview of
/// how many sessions the rule yields.
///
/// Inbound values that match what the editor last emitted, or the value it
/// last received while the form has not taken up an emission yet, are
/// already applied and are not parsed again. The subscriber is only
/// notified when the canonical string differs from the last one emitted.
pub struct RuleEditor<S: RuleSubscriber> {
    state: EditableRuleState,
    start: NaiveDateTime,
    config: Config,
    rule: Option<RecurrenceRule>,
    preview: OccurrencePreview,
    last_received: Option<String>,
    last_emitted: Option<String>,
    subscriber: S,
}

impl<S: RuleSubscriber> RuleEditor<S> {
    /// Mounts the editor with the rule currently held by the form, if any.
    /// A missing or malformed rule is replaced by the default rule.
    pub fn new(initial: Option<&str>, start: NaiveDateTime, config: &Config, subscriber: S) -> Self {
        let default_rule = RecurrenceRule::default_for(&start);
        let mut editor = Self {
            state: EditableRuleState::from_rule(&default_rule, &start),
            start,
            config: config.clone(),
            rule: None,
            preview: OccurrencePreview::Unknown,
            last_received: None,
            last_emitted: None,
            subscriber,
        };
        editor.apply_inbound(initial);
        editor
    }

    /// The form passed a (possibly unchanged) rule string down again
    pub fn receive_rule(&mut self, value: Option<&str>) {
        if value == self.last_emitted.as_deref() {
            // The form took up the emission, older values are external again
            self.last_received = value.map(String::from);
            debug!("Rule {:?} is already applied", value);
            return;
        }
        if value == self.last_received.as_deref() {
            debug!("Rule {:?} is already applied", value);
            return;
        }
        self.apply_inbound(value);
    }

    /// The start of the event changed
    pub fn receive_start(&mut self, start: NaiveDateTime) {
        if start == self.start {
            return;
        }
        self.start = start;
        self.sync();
    }

    pub fn set_frequency(&mut self, frequency: RRuleFrequency) {
        self.state.frequency = frequency;
        self.sync();
    }

    pub fn set_interval(&mut self, interval: Option<i64>) {
        self.state.interval = interval;
        self.sync();
    }

    /// Toggles a weekday coming from the calendar widget,
    /// where Sunday is 0 and Saturday is 6
    pub fn toggle_calendar_day(&mut self, calendar_day: i64) {
        if self.state.frequency == RRuleFrequency::Weekly && self.state.weekdays.is_empty() {
            self.state.weekdays.insert(WeekDay::of(&self.start.date()));
        }
        self.state
            .toggle_weekday(WeekDay::from_calendar_day(calendar_day));
        self.sync();
    }

    pub fn set_weekdays(&mut self, weekdays: impl IntoIterator<Item = WeekDay>) {
        self.state.weekdays = weekdays.into_iter().collect();
        self.sync();
    }

    pub fn set_end_condition(&mut self, end_condition: EndCondition) {
        self.state.set_end_condition(end_condition);
        self.sync();
    }

    pub fn set_count(&mut self, count: Option<i64>) {
        self.state.set_count(count);
        self.sync();
    }

    pub fn set_until(&mut self, until: Option<NaiveDate>) {
        self.state.set_until(until);
        self.sync();
    }

    pub fn state(&self) -> &EditableRuleState {
        &self.state
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// The rule the current state reconciles to, `None` while it is incomplete
    pub fn rule(&self) -> Option<&RecurrenceRule> {
        self.rule.as_ref()
    }

    /// Last canonical string handed to the form
    pub fn canonical(&self) -> Option<&str> {
        self.last_emitted.as_deref()
    }

    pub fn preview(&self) -> OccurrencePreview {
        self.preview
    }

    pub fn is_large_result(&self) -> bool {
        self.preview.is_large(self.config.large_result_threshold)
    }

    /// Selected weekdays in the calendar convention, for the toggle buttons
    pub fn selected_calendar_days(&self) -> Vec<usize> {
        let weekdays = match &self.rule {
            Some(rule) if rule.frequency() == RRuleFrequency::Weekly => rule.weekdays(),
            _ => &self.state.weekdays,
        };
        let mut days = weekdays
            .iter()
            .map(|wday| wday.calendar_day())
            .collect::<Vec<_>>();
        days.sort_unstable();
        days
    }

    /// First sessions of the rule, at most `Config::preview_list_limit`
    pub fn sessions(&self, duration: Duration) -> Vec<SessionInstance> {
        match &self.rule {
            Some(rule) => expand_sessions(
                rule,
                self.start,
                duration,
                OccurrenceBound::new(self.config.preview_list_limit),
            ),
            None => Vec::new(),
        }
    }

    fn apply_inbound(&mut self, value: Option<&str>) {
        let rule = match value {
            Some(value) => RecurrenceRule::parse(value, &self.start).unwrap_or_else(|e| {
                warn!("{}. Falling back to the default rule.", e);
                RecurrenceRule::default_for(&self.start)
            }),
            None => RecurrenceRule::default_for(&self.start),
        };
        self.state = EditableRuleState::from_rule(&rule, &self.start);
        // The form already holds this value
        self.last_received = value.map(String::from);
        self.last_emitted = value.map(String::from);
        self.sync();
    }

    fn sync(&mut self) {
        let rule = match self.state.reconcile(&self.start) {
            Ok(rule) => rule,
            Err(e) => {
                debug!("Rule is not complete yet: {}", e);
                self.rule = None;
                self.preview = OccurrencePreview::Unknown;
                return;
            }
        };

        self.preview =
            OccurrencePreview::compute(&rule, self.start, &self.config.count_options);
        let canonical = rule.to_string();
        self.rule = Some(rule);

        if self.last_emitted.as_deref() == Some(canonical.as_str()) {
            return;
        }
        self.subscriber.notify(&canonical);
        self.last_emitted = Some(canonical);
    }
}
