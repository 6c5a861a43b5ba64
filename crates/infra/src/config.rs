use event_sessions_domain::CountOptions;
use std::{fmt::Display, str::FromStr};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Guards used when counting how many sessions a recurrence produces.
    /// Counting an `UNTIL` rule that ends years into the future is refused
    /// and shown as a "very large" result instead.
    pub count_options: CountOptions,
    /// Number of sessions above which the preview is flagged as large
    pub large_result_threshold: usize,
    /// Maximum number of sessions listed in a preview
    pub preview_list_limit: usize,
}

impl Config {
    pub fn new() -> Self {
        let defaults = Self::default();
        Self {
            count_options: CountOptions {
                max_span_years: env_or(
                    "RECURRENCE_MAX_SPAN_YEARS",
                    defaults.count_options.max_span_years,
                ),
                max_occurrences: env_or(
                    "RECURRENCE_MAX_OCCURRENCES",
                    defaults.count_options.max_occurrences,
                ),
            },
            large_result_threshold: env_or(
                "SESSION_WARNING_THRESHOLD",
                defaults.large_result_threshold,
            ),
            preview_list_limit: env_or("PREVIEW_LIST_LIMIT", defaults.preview_list_limit),
        }
    }
}

impl Default for Config {
    /// The built in values, without looking at the environment
    fn default() -> Self {
        Self {
            count_options: CountOptions::default(),
            large_result_threshold: 100,
            preview_list_limit: 50,
        }
    }
}

fn env_or<T: FromStr + Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => parse_or(name, &value, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr + Display>(name: &str, value: &str, default: T) -> T {
    match value.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(
                "The given {}: {} is not valid, falling back to the default: {}.",
                name, value, default
            );
            default
        }
    }
}
