//! Aggregation and query services.
//!
//! [`aggregation`] holds the pure folds over ingested data, [`cache`] the time-bounded
//! memoization used to avoid re-reading the source, and [`presence`] the query surface
//! that combines the two.

pub mod aggregation;
#[cfg(test)]
mod aggregation_tests;
pub mod cache;
pub mod presence;

pub use aggregation::{
    group_by_weekday, group_by_weekday_start_end, mean_by_weekday, restructure, StartEnd,
    WeekdayBucket,
};
pub use cache::{CacheEntry, Clock, ManualClock, SystemClock, TtlCache};
pub use presence::{
    LocationCategoryView, MonthTotals, PresenceService, SubjectSummary, WeekdayStartEnd,
};
