use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use event_sessions_domain::SessionInstance;
use event_sessions_editor::{OccurrencePreview, RuleEditor};
use event_sessions_infra::SessionsContext;
use itertools::Itertools;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "event_sessions", about = "Preview the sessions of a recurring event")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count and list the sessions a recurrence rule produces
    Preview {
        /// Canonical rule, e.g. FREQ=WEEKLY;INTERVAL=1;BYDAY=MO,WE;COUNT=6
        #[arg(long)]
        rule: Option<String>,
        /// Start of the first session (YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS]), defaults to now
        #[arg(long, value_parser = parse_start)]
        start: Option<NaiveDateTime>,
        #[arg(long, default_value_t = 60)]
        duration_minutes: i64,
        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the canonical form of a rule
    Normalize {
        #[arg(long)]
        rule: String,
        #[arg(long, value_parser = parse_start)]
        start: Option<NaiveDateTime>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewReport {
    pub rule: String,
    pub start: NaiveDateTime,
    pub preview: OccurrencePreview,
    pub large_result: bool,
    pub sessions: Vec<SessionInstance>,
}

impl PreviewReport {
    fn to_text(&self) -> String {
        let count = match self.preview {
            OccurrencePreview::Count(count) => count.to_string(),
            OccurrencePreview::VeryLarge => "very large".into(),
            OccurrencePreview::Unknown => "unknown".into(),
        };
        let warning = if self.large_result { " (large)" } else { "" };
        let sessions = self
            .sessions
            .iter()
            .map(|s| {
                format!(
                    "  {} - {}",
                    s.start.format("%a %Y-%m-%d %H:%M"),
                    s.end.format("%H:%M")
                )
            })
            .join("\n");
        format!(
            "rule: {}\nsessions: {}{}\n{}",
            self.rule, count, warning, sessions
        )
    }
}

impl Command {
    pub fn run(&self, ctx: &SessionsContext) -> anyhow::Result<String> {
        match self {
            Self::Preview {
                rule,
                start,
                duration_minutes,
                json,
            } => {
                let report = preview(ctx, rule.as_deref(), *start, *duration_minutes)?;
                if *json {
                    serde_json::to_string_pretty(&report).context("Unable to serialize preview")
                } else {
                    Ok(report.to_text())
                }
            }
            Self::Normalize { rule, start } => {
                let start = start.unwrap_or_else(|| ctx.sys.local_now());
                let editor =
                    RuleEditor::new(Some(rule.as_str()), start, &ctx.config, |_: &str| ());
                Ok(editor.canonical().unwrap_or_default().to_string())
            }
        }
    }
}

pub fn preview(
    ctx: &SessionsContext,
    rule: Option<&str>,
    start: Option<NaiveDateTime>,
    duration_minutes: i64,
) -> anyhow::Result<PreviewReport> {
    if duration_minutes <= 0 {
        anyhow::bail!("The session duration must be positive, got {}", duration_minutes);
    }
    let duration = Duration::try_minutes(duration_minutes)
        .with_context(|| format!("Duration of {} minutes is too long", duration_minutes))?;

    let start = start.unwrap_or_else(|| ctx.sys.local_now());
    let editor = RuleEditor::new(rule, start, &ctx.config, |_: &str| ());
    let rule = editor
        .canonical()
        .context("The rule editor did not produce a rule")?
        .to_string();

    Ok(PreviewReport {
        rule,
        start,
        preview: editor.preview(),
        large_result: editor.is_large_result(),
        sessions: editor.sessions(duration),
    })
}

fn parse_start(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|_| format!("`{}` is not a valid start date", value))
}
