//! # Presence Analyzer
//!
//! Ingestion and aggregation of employee attendance records.
//!
//! A CSV source of `(subject, day, start, end[, location, category])` rows is parsed
//! into an [`AttendanceStore`](models::AttendanceStore), cached for a configurable
//! window, and queried through [`PresenceService`](services::PresenceService).
//!
//! ## Architecture
//!
//! - [`parsing`]: strict per-row parsing for the basic and extended schemas
//! - [`io`]: tolerant ingestion of a whole source file
//! - [`models`]: attendance types and time helpers
//! - [`services`]: weekday/month aggregations, the TTL cache and the query layer
//! - [`config`]: `presence.toml` and `PRESENCE_*` environment settings
//! - [`error`]: the crate error type
//!
//! ## Example
//!
//! ```no_run
//! use presence_analyzer::config::AnalyzerConfig;
//! use presence_analyzer::services::PresenceService;
//!
//! let config = AnalyzerConfig::from_env()?;
//! let service = PresenceService::from_config(&config);
//! for (weekday, seconds) in service.weekday_mean_durations(10)? {
//!     println!("{weekday}: {seconds:.0}s");
//! }
//! # Ok::<(), presence_analyzer::error::AnalyzerError>(())
//! ```

// AnalyzerError carries a context block on every variant
#![allow(clippy::result_large_err)]

pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod parsing;
pub mod services;

pub use error::{AnalyzerError, AnalyzerResult};
