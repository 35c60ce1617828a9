//! Query layer consumed by presentation code.
//!
//! [`PresenceService`] owns two caches: the ingested store and the month/location
//! totals derived from it. Both are injected so tests can supply their own clocks and
//! producers.

use chrono::Duration;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, AnalyzerResult, ErrorContext};
use crate::io::AttendanceLoader;
use crate::models::{AttendanceStore, Category, SubjectId, SubjectPresence};
use crate::parsing::SchemaVariant;
use crate::services::aggregation::{
    self, CategoryLocationTable, LocationCategoryTable, MonthLocationTable, WeekdayBucket,
};
use crate::services::cache::{Clock, SystemClock, TtlCache};

/// Cached snapshot of the ingested source.
pub type StoreCache = TtlCache<Arc<AttendanceStore>>;

/// Cached month/location totals.
pub type TotalsCache = TtlCache<Arc<MonthTotals>>;

/// Month/location totals together with the store snapshot they were folded from.
#[derive(Debug, Clone)]
pub struct MonthTotals {
    source: Arc<AttendanceStore>,
    table: MonthLocationTable,
}

impl MonthTotals {
    pub fn new(source: Arc<AttendanceStore>) -> Self {
        let table = aggregation::month_location_totals(&source);
        Self { source, table }
    }

    /// Whether these totals were computed from `store`.
    pub fn built_from(&self, store: &Arc<AttendanceStore>) -> bool {
        Arc::ptr_eq(&self.source, store)
    }

    pub fn table(&self) -> &MonthLocationTable {
        &self.table
    }
}

/// A subject as listed for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSummary {
    pub subject_id: SubjectId,
    pub name: String,
}

/// Mean start and end (seconds since midnight) for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayStartEnd {
    pub weekday: &'static str,
    pub mean_start: f64,
    pub mean_end: f64,
}

/// Location/category totals for a month, optionally narrowed to one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum LocationCategoryView {
    /// location -> category -> seconds
    ByLocation { table: LocationCategoryTable },
    /// category -> location -> seconds
    ByCategory { table: CategoryLocationTable },
}

/// Build the ingestion cache for a source file.
pub fn store_cache(
    path: impl Into<PathBuf>,
    schema: SchemaVariant,
    ttl: Duration,
    clock: Arc<dyn Clock>,
) -> StoreCache {
    let path = path.into();
    TtlCache::new("attendance_store", ttl, clock, move || {
        AttendanceLoader::load_from_file(&path, schema).map(Arc::new)
    })
}

/// Build the month/location totals cache on top of a store cache.
pub fn totals_cache(store: Arc<StoreCache>, ttl: Duration, clock: Arc<dyn Clock>) -> TotalsCache {
    TtlCache::new("month_location_totals", ttl, clock, move || {
        Ok(Arc::new(MonthTotals::new(store.get()?)))
    })
}

/// Read-only queries over cached attendance data.
#[derive(Debug, Clone)]
pub struct PresenceService {
    store: Arc<StoreCache>,
    totals: Arc<TotalsCache>,
}

impl PresenceService {
    pub fn new(store: Arc<StoreCache>, totals: Arc<TotalsCache>) -> Self {
        Self { store, totals }
    }

    /// Wire both caches from configuration using the wall clock.
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Wire both caches from configuration with an explicit clock.
    pub fn with_clock(config: &AnalyzerConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(store_cache(
            config.source.csv_path.clone(),
            config.source.schema,
            config.cache.store_ttl(),
            Arc::clone(&clock),
        ));
        let totals = Arc::new(totals_cache(
            Arc::clone(&store),
            config.cache.totals_ttl(),
            clock,
        ));
        Self::new(store, totals)
    }

    /// Current snapshot of the whole store.
    pub fn store(&self) -> AnalyzerResult<Arc<AttendanceStore>> {
        self.store.get()
    }

    /// All subjects, ordered by id, with a generated display label.
    pub fn subjects(&self) -> AnalyzerResult<Vec<SubjectSummary>> {
        let store = self.store.get()?;
        Ok(store
            .subject_ids()
            .map(|subject_id| SubjectSummary {
                subject_id,
                name: format!("User {}", subject_id),
            })
            .collect())
    }

    /// Presence rows of one subject.
    ///
    /// # Errors
    /// [`AnalyzerError::NotFound`] if the subject has no rows.
    pub fn subject_presence(&self, subject_id: SubjectId) -> AnalyzerResult<SubjectPresence> {
        let store = self.store.get()?;
        store
            .subject(subject_id)
            .cloned()
            .ok_or_else(|| unknown_subject(subject_id, "subject_presence"))
    }

    /// Durations grouped by weekday (all seven buckets).
    pub fn weekday_durations(
        &self,
        subject_id: SubjectId,
    ) -> AnalyzerResult<WeekdayBucket<Vec<i64>>> {
        self.with_subject(subject_id, "weekday_durations", aggregation::group_by_weekday)
    }

    /// Mean presence duration per weekday, Monday first.
    pub fn weekday_mean_durations(
        &self,
        subject_id: SubjectId,
    ) -> AnalyzerResult<Vec<(&'static str, f64)>> {
        self.with_subject(subject_id, "weekday_mean_durations", |items| {
            aggregation::weekday_means(&aggregation::group_by_weekday(items))
        })
    }

    /// Total presence duration per weekday, Monday first.
    pub fn weekday_totals(
        &self,
        subject_id: SubjectId,
    ) -> AnalyzerResult<Vec<(&'static str, i64)>> {
        self.with_subject(subject_id, "weekday_totals", |items| {
            aggregation::weekday_totals(&aggregation::group_by_weekday(items))
        })
    }

    /// Mean start and end per weekday, Monday first.
    pub fn weekday_start_end_means(
        &self,
        subject_id: SubjectId,
    ) -> AnalyzerResult<Vec<WeekdayStartEnd>> {
        self.with_subject(subject_id, "weekday_start_end_means", |items| {
            aggregation::group_by_weekday_start_end(items)
                .iter()
                .filter_map(|(weekday, bucket)| aggregation::mean_by_weekday(*weekday, bucket))
                .map(|(weekday, mean_start, mean_end)| WeekdayStartEnd {
                    weekday,
                    mean_start,
                    mean_end,
                })
                .collect()
        })
    }

    /// Every month (`YYYY-MM`) that has at least one entry, ascending.
    pub fn months_available(&self) -> AnalyzerResult<Vec<String>> {
        let store = self.store.get()?;
        Ok(aggregation::months_present(&store).into_iter().collect())
    }

    /// Location totals for one month.
    ///
    /// A month with entries but no located entries yields an empty map. Existence and
    /// totals always come from the same store snapshot: cached totals folded from an
    /// older snapshot are bypassed in favour of the current one.
    ///
    /// # Errors
    /// [`AnalyzerError::NotFound`] if no entry falls in `month`.
    pub fn location_totals(&self, month: &str) -> AnalyzerResult<BTreeMap<String, i64>> {
        let store = self.ensure_month(month, "location_totals")?;
        let totals = self.totals.get()?;

        let table = if totals.built_from(&store) {
            totals.table().get(month).cloned()
        } else {
            debug!("Month/location totals lag the store, folding month {} directly", month);
            aggregation::month_location_totals(&store).remove(month)
        };
        Ok(table.unwrap_or_default())
    }

    /// Location/category totals for one month.
    ///
    /// With a category, the table is transposed and narrowed to that category.
    pub fn location_category_totals(
        &self,
        month: &str,
        category: Option<Category>,
    ) -> AnalyzerResult<LocationCategoryView> {
        let store = self.ensure_month(month, "location_category_totals")?;
        let table = aggregation::location_category_totals(&store, month);

        Ok(match category {
            None => LocationCategoryView::ByLocation { table },
            Some(category) => {
                let mut transposed = aggregation::restructure(&table);
                transposed.retain(|key, _| *key == category);
                LocationCategoryView::ByCategory { table: transposed }
            }
        })
    }

    fn with_subject<R>(
        &self,
        subject_id: SubjectId,
        operation: &'static str,
        f: impl FnOnce(&SubjectPresence) -> R,
    ) -> AnalyzerResult<R> {
        let store = self.store.get()?;
        match store.subject(subject_id) {
            Some(items) => Ok(f(items)),
            None => Err(unknown_subject(subject_id, operation)),
        }
    }

    fn ensure_month(
        &self,
        month: &str,
        operation: &'static str,
    ) -> AnalyzerResult<Arc<AttendanceStore>> {
        let store = self.store.get()?;
        if aggregation::months_present(&store).contains(month) {
            Ok(store)
        } else {
            debug!("Month {} not found!", month);
            Err(AnalyzerError::not_found_with_context(
                format!("month {}", month),
                ErrorContext::new(operation)
                    .with_entity("month")
                    .with_entity_id(month),
            ))
        }
    }
}

fn unknown_subject(subject_id: SubjectId, operation: &'static str) -> AnalyzerError {
    debug!("User {} not found!", subject_id);
    AnalyzerError::not_found_with_context(
        format!("subject {}", subject_id),
        ErrorContext::new(operation)
            .with_entity("subject")
            .with_entity_id(subject_id),
    )
}
