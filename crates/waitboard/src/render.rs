//! Plain-text rendering of reports.
//!
//! Produces the terminal equivalents of the dashboard: the overall average
//! headline, a horizontal bar chart with one line per bucket, and the raw
//! observation table. Every function returns a `String` so output can be
//! tested without a terminal.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::aggregate::Summary;
use crate::dashboard::Report;
use crate::observation::Observation;

/// Width of the longest chart bar, in characters.
pub const BAR_WIDTH: usize = 40;

const BAR_CHAR: char = '#';
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn hours_label(hours: u32) -> String {
    if hours == 1 {
        "Last Hour".to_string()
    } else {
        format!("Last {hours} Hours")
    }
}

/// Headline with the overall average, or the no-data message.
#[must_use]
pub fn headline(summary: &Summary, window_hours: u32) -> String {
    match summary.overall_average {
        Some(avg) => format!(
            "Average Wait Time ({}): {avg:.2} minutes",
            hours_label(window_hours)
        ),
        None => format!(
            "No data available for the {}.",
            hours_label(window_hours).to_lowercase()
        ),
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar_len(average: f64, max: f64) -> usize {
    if max <= 0.0 {
        return 0;
    }
    let len = (average / max * BAR_WIDTH as f64).round();
    // Non-zero averages always get at least one mark.
    if average > 0.0 {
        (len as usize).max(1)
    } else {
        0
    }
}

/// One line per bucket, oldest first. Empty buckets read `no data`.
#[must_use]
pub fn chart(summary: &Summary) -> String {
    let max = summary.max_average().unwrap_or(0.0);
    let mut out = String::new();

    for bucket in &summary.buckets {
        let start = bucket.interval_start.format(TIME_FORMAT);
        let _ = match bucket.average {
            Some(avg) => writeln!(
                out,
                "{start}  {:<width$}  {avg:>7.2} min  (n={})",
                BAR_CHAR.to_string().repeat(bar_len(avg, max)),
                bucket.count,
                width = BAR_WIDTH
            ),
            None => writeln!(out, "{start}  {:<width$}  no data", "", width = BAR_WIDTH),
        };
    }

    out
}

/// Raw observation table.
#[must_use]
pub fn raw_table(observations: &[Observation]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>8}  {:<19}  {:>7}", "ID", "SUBMITTED AT (UTC)", "MINUTES");

    if observations.is_empty() {
        let _ = writeln!(out, "(no observations)");
        return out;
    }

    for obs in observations {
        let _ = writeln!(
            out,
            "{:>8}  {:<19}  {:>7}",
            obs.id,
            obs.submitted_at.format("%Y-%m-%d %H:%M:%S"),
            obs.value
        );
    }
    out
}

/// Full plain-text report.
#[must_use]
pub fn report(report: &Report, include_raw: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", headline(&report.summary, report.window.hours));

    if !report.summary.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Wait Times Over the {} (Averaged per {})",
            hours_label(report.window.hours),
            bucket_label(report.window.bucket_hours)
        );
        out.push_str(&chart(&report.summary));
    }

    if include_raw {
        let _ = writeln!(out);
        let _ = writeln!(out, "Raw Data");
        out.push_str(&raw_table(&report.observations));
    }

    out
}

fn bucket_label(hours: u32) -> String {
    if hours == 1 {
        "Hour".to_string()
    } else {
        format!("{hours} Hours")
    }
}

/// Acknowledgement printed after a successful submission.
#[must_use]
pub fn submitted(observation: &Observation) -> String {
    format!(
        "Wait time submitted successfully! ({} minutes at {} UTC, id {})",
        observation.value,
        format_time(observation.submitted_at),
        observation.id
    )
}

/// Acknowledgement printed after a clear.
#[must_use]
pub fn cleared(removed: usize) -> String {
    format!("All wait times have been cleared! ({removed} removed)")
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}
