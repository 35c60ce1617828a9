//! Attendance records and the per-subject store built from them.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identifier of the person an attendance row belongs to.
pub type SubjectId = i64;

/// Kind of presence recorded by the extended (6-column) schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Office,
    Remote,
    BusinessTrip,
    Training,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Office,
        Category::Remote,
        Category::BusinessTrip,
        Category::Training,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Office => "office",
            Category::Remote => "remote",
            Category::BusinessTrip => "business_trip",
            Category::Training => "training",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "office" => Ok(Category::Office),
            "remote" => Ok(Category::Remote),
            "business_trip" => Ok(Category::BusinessTrip),
            "training" => Ok(Category::Training),
            _ => Err(format!(
                "unknown category, expected one of {}",
                Category::ALL.map(|c| c.as_str()).join(", ")
            )),
        }
    }
}

/// One validated row of the attendance source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub subject_id: SubjectId,
    pub day: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub location: Option<String>,
    pub category: Option<Category>,
}

/// A subject's presence on a single day.
///
/// `start <= end` is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Presence {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start,
            end,
            location: None,
            category: None,
        }
    }

    pub fn duration(&self) -> i64 {
        super::time::duration(self.start, self.end)
    }
}

impl From<AttendanceEntry> for Presence {
    fn from(entry: AttendanceEntry) -> Self {
        Self {
            start: entry.start,
            end: entry.end,
            location: entry.location,
            category: entry.category,
        }
    }
}

/// Presence of one subject keyed by day.
pub type SubjectPresence = BTreeMap<NaiveDate, Presence>;

/// Ingested attendance data: subject -> day -> presence.
///
/// Each `(subject, day)` pair holds exactly one presence; inserting the same pair again
/// replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceStore {
    subjects: BTreeMap<SubjectId, SubjectPresence>,
}

impl AttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any previous presence for the same subject and day.
    pub fn insert(&mut self, entry: AttendanceEntry) -> Option<Presence> {
        let subject_id = entry.subject_id;
        let day = entry.day;
        self.subjects
            .entry(subject_id)
            .or_default()
            .insert(day, Presence::from(entry))
    }

    /// Presence rows for one subject, if the subject appears in the data.
    pub fn subject(&self, subject_id: SubjectId) -> Option<&SubjectPresence> {
        self.subjects.get(&subject_id)
    }

    pub fn contains_subject(&self, subject_id: SubjectId) -> bool {
        self.subjects.contains_key(&subject_id)
    }

    /// Subject ids in ascending order.
    pub fn subject_ids(&self) -> impl Iterator<Item = SubjectId> + '_ {
        self.subjects.keys().copied()
    }

    /// Every `(subject, day, presence)` triple.
    pub fn iter(&self) -> impl Iterator<Item = (SubjectId, NaiveDate, &Presence)> + '_ {
        self.subjects.iter().flat_map(|(subject_id, days)| {
            days.iter()
                .map(move |(day, presence)| (*subject_id, *day, presence))
        })
    }

    /// Number of subjects.
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Total number of `(subject, day)` entries.
    pub fn entry_count(&self) -> usize {
        self.subjects.values().map(BTreeMap::len).sum()
    }
}

impl FromIterator<AttendanceEntry> for AttendanceStore {
    fn from_iter<I: IntoIterator<Item = AttendanceEntry>>(iter: I) -> Self {
        iter.into_iter().fold(AttendanceStore::new(), |mut store, entry| {
            store.insert(entry);
            store
        })
    }
}
