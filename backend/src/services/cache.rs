//! Time-bounded, single-flight memoization of an expensive producer.
//!
//! A [`TtlCache`] owns one producer and at most one [`CacheEntry`]. The lock is held
//! across the whole check-produce-store sequence, so at most one producer call is in
//! flight per cache and callers that waited on it reuse its result.
//!
//! ```text
//! EMPTY --(first get)--> FRESH --(elapsed >= ttl)--> STALE --(get)--> FRESH
//! ```

use chrono::{DateTime, Duration, Utc};
use log::debug;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::error::AnalyzerError;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A computed value and the moment its computation finished.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub computed_at: DateTime<Utc>,
}

type Producer<T, E> = Box<dyn Fn() -> Result<T, E> + Send + Sync>;

/// Memoizes `producer` for `ttl`.
///
/// An entry older than `ttl` counts as never computed: the next [`get`](Self::get)
/// recomputes and the new window starts when that computation completes. A failed
/// producer call leaves the previous entry in place and returns the error.
pub struct TtlCache<T, E = AnalyzerError> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    producer: Producer<T, E>,
    entry: Mutex<Option<CacheEntry<T>>>,
}

impl<T: Clone, E> TtlCache<T, E> {
    pub fn new<F>(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>, producer: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            name,
            ttl,
            clock,
            producer: Box::new(producer),
            entry: Mutex::new(None),
        }
    }

    /// Return the cached value, recomputing it first if the cache is empty or stale.
    pub fn get(&self) -> Result<T, E> {
        let mut entry = self.entry.lock();

        if let Some(cached) = entry.as_ref() {
            let age = self.clock.now() - cached.computed_at;
            if age < self.ttl {
                return Ok(cached.value.clone());
            }
            debug!(
                "Cache '{}' stale after {}s, recomputing",
                self.name,
                age.num_seconds()
            );
        } else {
            debug!("Cache '{}' empty, computing", self.name);
        }

        let value = (self.producer)()?;
        *entry = Some(CacheEntry {
            value: value.clone(),
            computed_at: self.clock.now(),
        });
        Ok(value)
    }
}

impl<T, E> fmt::Debug for TtlCache<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
