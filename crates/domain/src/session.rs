use crate::{
    occurrence::{generate, OccurrenceBound},
    shared::recurrence::RecurrenceRule,
};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One materialized session of a recurring event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInstance {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Expands the rule into sessions that each last `duration`.
/// Sessions whose end can not be represented are left out.
pub fn expand_sessions(
    rule: &RecurrenceRule,
    start: NaiveDateTime,
    duration: Duration,
    bound: OccurrenceBound,
) -> Vec<SessionInstance> {
    generate(rule, start, bound)
        .filter_map(|occurrence| {
            occurrence
                .checked_add_signed(duration)
                .map(|end| SessionInstance {
                    start: occurrence,
                    end,
                })
        })
        .collect()
}
