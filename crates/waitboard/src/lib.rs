//! `waitboard` - Wait-time reporting with hourly averages
//!
//! Users submit the wait they are currently seeing; observations are stored
//! in `SQLite` and reported as per-bucket averages over a trailing window,
//! with empty buckets shown as explicit gaps.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod observation;
pub mod render;
pub mod storage;

pub use aggregate::{aggregate, Bucket, Summary, Window};
pub use config::Config;
pub use dashboard::{Dashboard, Report};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use observation::Observation;
pub use storage::{Storage, StorageStats};
