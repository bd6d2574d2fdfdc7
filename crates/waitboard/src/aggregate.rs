//! Windowed aggregation of wait-time observations.
//!
//! Observations are grouped into fixed-width buckets aligned to multiples of
//! the bucket width since the Unix epoch (UTC). With the default one-hour
//! width that is the calendar hour. Every slot between the cutoff and `now`
//! is reported, including empty ones, so a chart shows a gap instead of a
//! false zero.
//!
//! The engine is pure: it never reads the clock. Callers pass the same `now`
//! they used to compute the cutoff for the storage read.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::observation::Observation;

/// Default trailing window, in hours.
pub const DEFAULT_WINDOW_HOURS: u32 = 6;

/// Default bucket width, in hours.
pub const DEFAULT_BUCKET_HOURS: u32 = 1;

/// Longest window accepted, in hours (366 days).
///
/// Bounds both the cutoff arithmetic and the number of buckets allocated
/// for one report.
pub const MAX_WINDOW_HOURS: u32 = 366 * 24;

const SECONDS_PER_HOUR: i64 = 60 * 60;

/// The trailing time span considered for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Length of the window in hours.
    pub hours: u32,
    /// Width of each bucket in hours.
    pub bucket_hours: u32,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            hours: DEFAULT_WINDOW_HOURS,
            bucket_hours: DEFAULT_BUCKET_HOURS,
        }
    }
}

impl Window {
    /// Create a window, rejecting zero widths and buckets wider than the window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either length is zero,
    /// `hours > MAX_WINDOW_HOURS`, or `bucket_hours > hours`.
    pub fn new(hours: u32, bucket_hours: u32) -> Result<Self> {
        if hours == 0 {
            return Err(Error::validation("window must be at least one hour"));
        }
        if hours > MAX_WINDOW_HOURS {
            return Err(Error::validation(format!(
                "window ({hours}h) cannot exceed {MAX_WINDOW_HOURS}h"
            )));
        }
        if bucket_hours == 0 {
            return Err(Error::validation("bucket width must be at least one hour"));
        }
        if bucket_hours > hours {
            return Err(Error::validation(format!(
                "bucket width ({bucket_hours}h) cannot exceed the window ({hours}h)"
            )));
        }
        Ok(Self {
            hours,
            bucket_hours,
        })
    }

    /// The exclusive lower bound of the window ending at `now`.
    ///
    /// Windows longer than [`MAX_WINDOW_HOURS`] are clamped to it, and the
    /// result saturates at the earliest representable time.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let span = Duration::hours(i64::from(self.hours.min(MAX_WINDOW_HOURS)));
        now.checked_sub_signed(span)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Width of one bucket.
    #[must_use]
    pub fn bucket_width(&self) -> Duration {
        Duration::hours(i64::from(self.bucket_hours.min(MAX_WINDOW_HOURS)))
    }

    /// Aggregate `observations` over the window ending at `now`.
    #[must_use]
    pub fn summarize(&self, observations: &[Observation], now: DateTime<Utc>) -> Summary {
        aggregate(observations, self.cutoff(now), now, self.bucket_width())
    }
}

/// Aggregated statistics for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Start of the interval (inclusive).
    pub interval_start: DateTime<Utc>,
    /// Mean wait time, `None` when the bucket is empty.
    pub average: Option<f64>,
    /// Number of observations in the bucket.
    pub count: usize,
}

/// Result of aggregating one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Exclusive lower bound of the window.
    pub cutoff: DateTime<Utc>,
    /// Inclusive upper bound of the window.
    pub now: DateTime<Utc>,
    /// One bucket per slot, oldest first.
    pub buckets: Vec<Bucket>,
    /// Mean over every observation in the window, `None` when empty.
    pub overall_average: Option<f64>,
    /// Number of observations that fell inside the window.
    pub observation_count: usize,
}

impl Summary {
    /// Whether the window holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observation_count == 0
    }

    /// The largest bucket average, if any bucket has data.
    #[must_use]
    pub fn max_average(&self) -> Option<f64> {
        self.buckets
            .iter()
            .filter_map(|b| b.average)
            .reduce(f64::max)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: i128,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, value: i64) {
        self.sum += i128::from(value);
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

/// Start of the slot containing `timestamp`, in epoch seconds.
fn slot_start(timestamp: DateTime<Utc>, width_secs: i64) -> i64 {
    timestamp.timestamp().div_euclid(width_secs) * width_secs
}

/// Bucket `observations` over `(cutoff, now]`.
///
/// Observations outside `(cutoff, now]` are ignored for both the buckets and
/// the overall average, so a caller passing an unfiltered read gets the same
/// answer as one passing `read_since(cutoff)`. A bucket width under one second
/// is treated as one hour. Ranges longer than [`MAX_WINDOW_HOURS`] keep only
/// the most recent `MAX_WINDOW_HOURS` worth of slots.
#[must_use]
pub fn aggregate(
    observations: &[Observation],
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
    bucket_width: Duration,
) -> Summary {
    let width_secs = match bucket_width.num_seconds() {
        w if w > 0 => w,
        _ => SECONDS_PER_HOUR,
    };

    let last = slot_start(now, width_secs);
    let max_span = i64::from(MAX_WINDOW_HOURS) * SECONDS_PER_HOUR;
    let earliest = last - (max_span / width_secs) * width_secs;
    let first = slot_start(cutoff, width_secs).max(earliest);
    let slots = if last >= first {
        usize::try_from((last - first) / width_secs + 1).unwrap_or(0)
    } else {
        0
    };

    let mut per_slot = vec![Accumulator::default(); slots];
    let mut overall = Accumulator::default();

    for obs in observations
        .iter()
        .filter(|o| o.submitted_at > cutoff && o.submitted_at <= now)
    {
        let offset = (slot_start(obs.submitted_at, width_secs) - first) / width_secs;
        if let Some(acc) = usize::try_from(offset)
            .ok()
            .and_then(|i| per_slot.get_mut(i))
        {
            acc.add(obs.value);
            overall.add(obs.value);
        }
    }

    let buckets = per_slot
        .into_iter()
        .zip((0_i64..).map(|i| first + i * width_secs))
        .filter_map(|(acc, start)| {
            Utc.timestamp_opt(start, 0).single().map(|interval_start| Bucket {
                interval_start,
                average: acc.mean(),
                count: acc.count,
            })
        })
        .collect();

    Summary {
        cutoff,
        now,
        buckets,
        overall_average: overall.mean(),
        observation_count: overall.count,
    }
}
