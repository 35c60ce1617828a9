//! Pure aggregations over ingested attendance data.
//!
//! Every function here builds a fresh result structure by folding over its input and
//! never mutates the input. Weekday buckets always contain all seven Monday-first keys.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    duration, mean, month_key, seconds_since_midnight, weekday_abbr, weekday_index,
    AttendanceStore, Category, SubjectPresence, DAYS_IN_WEEK,
};

/// Weekday index (0 = Monday) -> per-day values.
pub type WeekdayBucket<T> = BTreeMap<usize, T>;

/// `YYYY-MM` -> location -> seconds.
pub type MonthLocationTable = BTreeMap<String, BTreeMap<String, i64>>;

/// location -> category -> seconds, for a single month.
pub type LocationCategoryTable = BTreeMap<String, BTreeMap<Category, i64>>;

/// category -> location -> seconds, the transpose of [`LocationCategoryTable`].
pub type CategoryLocationTable = BTreeMap<Category, BTreeMap<String, i64>>;

/// Start and end times (seconds since midnight) observed on one weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartEnd {
    pub starts: Vec<i64>,
    pub ends: Vec<i64>,
}

fn empty_week<T: Default>() -> WeekdayBucket<T> {
    (0..DAYS_IN_WEEK).map(|day| (day, T::default())).collect()
}

/// Group presence durations (seconds) by weekday.
pub fn group_by_weekday(items: &SubjectPresence) -> WeekdayBucket<Vec<i64>> {
    items.iter().fold(empty_week(), |mut buckets, (day, presence)| {
        buckets
            .entry(weekday_index(*day))
            .or_default()
            .push(duration(presence.start, presence.end));
        buckets
    })
}

/// Group start and end times (seconds since midnight) by weekday.
pub fn group_by_weekday_start_end(items: &SubjectPresence) -> WeekdayBucket<StartEnd> {
    items.iter().fold(empty_week(), |mut buckets, (day, presence)| {
        let bucket: &mut StartEnd = buckets.entry(weekday_index(*day)).or_default();
        bucket.starts.push(seconds_since_midnight(presence.start));
        bucket.ends.push(seconds_since_midnight(presence.end));
        buckets
    })
}

/// `(weekday abbreviation, mean start, mean end)` for one weekday bucket.
///
/// `None` if `weekday` is not in `0..7`.
pub fn mean_by_weekday(weekday: usize, bucket: &StartEnd) -> Option<(&'static str, f64, f64)> {
    weekday_abbr(weekday).map(|abbr| (abbr, mean(&bucket.starts), mean(&bucket.ends)))
}

/// Mean duration per weekday, Monday first.
pub fn weekday_means(buckets: &WeekdayBucket<Vec<i64>>) -> Vec<(&'static str, f64)> {
    buckets
        .iter()
        .filter_map(|(weekday, durations)| Some((weekday_abbr(*weekday)?, mean(durations))))
        .collect()
}

/// Summed duration per weekday, Monday first.
pub fn weekday_totals(buckets: &WeekdayBucket<Vec<i64>>) -> Vec<(&'static str, i64)> {
    buckets
        .iter()
        .filter_map(|(weekday, durations)| {
            Some((weekday_abbr(*weekday)?, durations.iter().sum::<i64>()))
        })
        .collect()
}

/// Every month present in the store, ascending.
pub fn months_present(store: &AttendanceStore) -> BTreeSet<String> {
    store.iter().map(|(_, day, _)| month_key(day)).collect()
}

/// Total presence per month and location. Entries without a location are excluded.
pub fn month_location_totals(store: &AttendanceStore) -> MonthLocationTable {
    store
        .iter()
        .filter_map(|(_, day, presence)| {
            presence
                .location
                .as_ref()
                .map(|location| (month_key(day), location, presence.duration()))
        })
        .fold(MonthLocationTable::new(), |mut table, (month, location, seconds)| {
            *table
                .entry(month)
                .or_default()
                .entry(location.clone())
                .or_insert(0) += seconds;
            table
        })
}

/// Total presence per location and category within `month` (`YYYY-MM`).
///
/// Entries lacking either a location or a category are excluded.
pub fn location_category_totals(store: &AttendanceStore, month: &str) -> LocationCategoryTable {
    store
        .iter()
        .filter(|(_, day, _)| month_key(*day) == month)
        .filter_map(|(_, _, presence)| match (&presence.location, presence.category) {
            (Some(location), Some(category)) => Some((location, category, presence.duration())),
            _ => None,
        })
        .fold(
            LocationCategoryTable::new(),
            |mut table, (location, category, seconds)| {
                *table
                    .entry(location.clone())
                    .or_default()
                    .entry(category)
                    .or_insert(0) += seconds;
                table
            },
        )
}

/// Transpose a two-level table: `outer -> inner -> v` becomes `inner -> outer -> v`.
///
/// Every `(outer, inner, v)` triple maps to exactly one `(inner, outer, v)` triple.
pub fn restructure<A, B, V>(table: &BTreeMap<A, BTreeMap<B, V>>) -> BTreeMap<B, BTreeMap<A, V>>
where
    A: Ord + Clone,
    B: Ord + Clone,
    V: Clone,
{
    table
        .iter()
        .flat_map(|(outer, row)| row.iter().map(move |(inner, value)| (outer, inner, value)))
        .fold(BTreeMap::new(), |mut transposed, (outer, inner, value)| {
            transposed
                .entry(inner.clone())
                .or_insert_with(BTreeMap::new)
                .insert(outer.clone(), value.clone());
            transposed
        })
}
