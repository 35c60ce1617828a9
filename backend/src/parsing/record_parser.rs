use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MalformedRecord;
use crate::models::{AttendanceEntry, Category, SubjectId};

/// Column layout of the attendance source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// `subject_id,date,start,end`
    #[default]
    Basic,
    /// `subject_id,date,start,end,location,category`
    Extended,
}

impl SchemaVariant {
    /// Number of fields a data row must have.
    pub fn column_count(&self) -> usize {
        match self {
            SchemaVariant::Basic => 4,
            SchemaVariant::Extended => 6,
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVariant::Basic => write!(f, "basic"),
            SchemaVariant::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for SchemaVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "4" => Ok(SchemaVariant::Basic),
            "extended" | "6" => Ok(SchemaVariant::Extended),
            other => Err(format!(
                "Unsupported schema '{}'. Use basic (4 columns) or extended (6 columns).",
                other
            )),
        }
    }
}

/// Parse one source row.
///
/// Returns `Ok(None)` when the row does not have the schema's column count (headers,
/// footers, blank lines). A row of the right shape with a bad field yields
/// [`MalformedRecord`] and must be discarded as a whole.
pub fn parse_record<S: AsRef<str>>(
    fields: &[S],
    schema: SchemaVariant,
) -> Result<Option<AttendanceEntry>, MalformedRecord> {
    if fields.len() != schema.column_count() {
        return Ok(None);
    }

    let subject_id = parse_subject_id(fields[0].as_ref())?;
    let day = parse_day(fields[1].as_ref())?;
    let start = parse_time("start", fields[2].as_ref())?;
    let end = parse_time("end", fields[3].as_ref())?;

    let (location, category) = match schema {
        SchemaVariant::Basic => (None, None),
        SchemaVariant::Extended => (
            parse_location(fields[4].as_ref()),
            parse_category(fields[5].as_ref())?,
        ),
    };

    Ok(Some(AttendanceEntry {
        subject_id,
        day,
        start,
        end,
        location,
        category,
    }))
}

fn parse_subject_id(raw: &str) -> Result<SubjectId, MalformedRecord> {
    raw.trim()
        .parse::<SubjectId>()
        .map_err(|e| MalformedRecord::new("subject_id", e.to_string()))
}

/// Strict `YYYY-MM-DD`.
fn parse_day(raw: &str) -> Result<NaiveDate, MalformedRecord> {
    let parts = fixed_width_fields(raw, '-', &[4, 2, 2])
        .ok_or_else(|| MalformedRecord::new("date", "expected YYYY-MM-DD"))?;

    NaiveDate::from_ymd_opt(parts[0] as i32, parts[1], parts[2])
        .ok_or_else(|| MalformedRecord::new("date", "no such calendar date"))
}

/// Strict 24-hour `HH:MM:SS`.
fn parse_time(field: &'static str, raw: &str) -> Result<NaiveTime, MalformedRecord> {
    let parts = fixed_width_fields(raw, ':', &[2, 2, 2])
        .ok_or_else(|| MalformedRecord::new(field, "expected HH:MM:SS"))?;

    NaiveTime::from_hms_opt(parts[0], parts[1], parts[2])
        .ok_or_else(|| MalformedRecord::new(field, "time component out of range"))
}

fn parse_location(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_category(raw: &str) -> Result<Option<Category>, MalformedRecord> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse::<Category>()
        .map(Some)
        .map_err(|e| MalformedRecord::new("category", e))
}

/// Split `raw` on `sep` into all-digit groups of exactly the given widths.
fn fixed_width_fields(raw: &str, sep: char, widths: &[usize]) -> Option<Vec<u32>> {
    let groups: Vec<&str> = raw.split(sep).collect();
    if groups.len() != widths.len() {
        return None;
    }

    groups
        .iter()
        .zip(widths)
        .map(|(group, width)| {
            if group.len() == *width && group.bytes().all(|b| b.is_ascii_digit()) {
                group.parse::<u32>().ok()
            } else {
                None
            }
        })
        .collect()
}
