//! Request-level operations for the presentation layer.
//!
//! A [`Dashboard`] pairs the storage gateway with a reporting [`Window`].
//! Each read takes a single `now` that is used for both the storage cutoff and
//! the bucketing, so one request never sees two different clocks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{Summary, Window};
use crate::error::Result;
use crate::observation::Observation;
use crate::storage::Storage;

/// Everything needed to render one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Window size the report was computed for.
    pub window: Window,
    /// Bucketed chart data and overall average.
    pub summary: Summary,
    /// Raw observations in the window, oldest first.
    pub observations: Vec<Observation>,
}

/// Storage plus the window used for reporting.
#[derive(Debug)]
pub struct Dashboard {
    storage: Storage,
    window: Window,
}

impl Dashboard {
    /// Create a dashboard over `storage`.
    #[must_use]
    pub fn new(storage: Storage, window: Window) -> Self {
        Self { storage, window }
    }

    /// The underlying storage gateway.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The reporting window.
    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    /// Record a wait time.
    ///
    /// # Errors
    ///
    /// Returns a validation error for negative values, or a storage error.
    pub fn submit(&self, value: i64) -> Result<Observation> {
        let observation = self.storage.insert(value)?;
        info!(
            "Recorded wait time of {} minutes (id {})",
            observation.value, observation.id
        );
        Ok(observation)
    }

    /// Raw observations in the window ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn raw(&self, now: DateTime<Utc>) -> Result<Vec<Observation>> {
        self.storage.read_since(self.window.cutoff(now))
    }

    /// Build the report for the window ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    pub fn report(&self, now: DateTime<Utc>) -> Result<Report> {
        let observations = self.raw(now)?;
        let summary = self.window.summarize(&observations, now);
        debug!(
            "Report over {}h: {} observations in {} buckets",
            self.window.hours,
            summary.observation_count,
            summary.buckets.len()
        );
        Ok(Report {
            window: self.window,
            summary,
            observations,
        })
    }

    /// Remove every observation, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the delete fails.
    pub fn clear(&self) -> Result<usize> {
        self.storage.clear_all()
    }
}
