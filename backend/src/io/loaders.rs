use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AnalyzerError, AnalyzerResult, ErrorContext};
use crate::models::AttendanceStore;
use crate::parsing::{parse_record, SchemaVariant};

/// Row counts observed while ingesting a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Rows that produced an entry (including ones later overwritten)
    pub data_rows: usize,
    /// Rows with the wrong column count
    pub skipped_rows: usize,
    /// Rows of the right shape whose fields failed to parse
    pub malformed_rows: usize,
}

/// Loads attendance sources into an [`AttendanceStore`].
pub struct AttendanceLoader;

impl AttendanceLoader {
    /// Read and ingest a comma-separated file.
    ///
    /// # Errors
    /// [`AnalyzerError::SourceUnavailable`] if the file cannot be opened or read.
    pub fn load_from_file(path: &Path, schema: SchemaVariant) -> AnalyzerResult<AttendanceStore> {
        Self::load_from_file_with_report(path, schema).map(|(store, _)| store)
    }

    /// Same as [`load_from_file`](Self::load_from_file), also returning row counts.
    pub fn load_from_file_with_report(
        path: &Path,
        schema: SchemaVariant,
    ) -> AnalyzerResult<(AttendanceStore, IngestReport)> {
        let file =
            File::open(path).map_err(|e| AnalyzerError::source_unavailable(path.display(), e))?;

        let (store, report) = Self::load_from_reader(file, schema).map_err(|e| match e {
            AnalyzerError::SourceUnavailable { message, source, .. } => {
                AnalyzerError::SourceUnavailable {
                    message,
                    context: ErrorContext::new("ingest")
                        .with_entity("source")
                        .with_entity_id(path.display()),
                    source,
                }
            }
            other => other,
        })?;

        info!(
            "Ingested {}: {} subjects, {} entries ({} data rows, {} skipped, {} malformed)",
            path.display(),
            store.len(),
            store.entry_count(),
            report.data_rows,
            report.skipped_rows,
            report.malformed_rows
        );

        Ok((store, report))
    }

    /// Ingest rows from any reader, in order. Later rows for the same subject and day
    /// replace earlier ones.
    pub fn load_from_reader<R: Read>(
        reader: R,
        schema: SchemaVariant,
    ) -> AnalyzerResult<(AttendanceStore, IngestReport)> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        csv_reader.records().enumerate().try_fold(
            (AttendanceStore::new(), IngestReport::default()),
            |(mut store, mut report), (index, record)| {
                let record = match record {
                    Ok(record) => record,
                    Err(e) if e.is_io_error() => {
                        return Err(read_error(e));
                    }
                    Err(e) => {
                        debug!(
                            "Problem with row {}: {}",
                            row_number(index, e.position()),
                            csv_error_reason(&e)
                        );
                        report.malformed_rows += 1;
                        return Ok((store, report));
                    }
                };

                let fields: Vec<&str> = record.iter().collect();
                match parse_record(&fields, schema) {
                    Ok(Some(entry)) => {
                        report.data_rows += 1;
                        store.insert(entry);
                    }
                    Ok(None) => report.skipped_rows += 1,
                    Err(e) => {
                        debug!(
                            "Problem with row {}: malformed {}",
                            row_number(index, record.position()),
                            e.field
                        );
                        report.malformed_rows += 1;
                    }
                }
                Ok((store, report))
            },
        )
    }
}

/// Ingest the file at `path` with the given schema.
pub fn ingest(path: &Path, schema: SchemaVariant) -> AnalyzerResult<AttendanceStore> {
    AttendanceLoader::load_from_file(path, schema)
}

/// Ingest an in-memory or streamed source with the given schema.
pub fn ingest_reader<R: Read>(
    reader: R,
    schema: SchemaVariant,
) -> AnalyzerResult<AttendanceStore> {
    AttendanceLoader::load_from_reader(reader, schema).map(|(store, _)| store)
}

/// Source line when the reader tracked it, otherwise the record index.
fn row_number(index: usize, position: Option<&csv::Position>) -> u64 {
    position.map(|p| p.line()).unwrap_or(index as u64)
}

fn read_error(err: csv::Error) -> AnalyzerError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => AnalyzerError::SourceUnavailable {
            message: io.to_string(),
            context: ErrorContext::new("ingest").with_entity("source"),
            source: Some(io),
        },
        other => AnalyzerError::source_unavailable_msg(
            format!("{:?}", other),
            ErrorContext::new("ingest").with_entity("source"),
        ),
    }
}

fn csv_error_reason(err: &csv::Error) -> &'static str {
    match err.kind() {
        csv::ErrorKind::Utf8 { .. } => "invalid UTF-8",
        csv::ErrorKind::UnequalLengths { .. } => "unequal lengths",
        _ => "unreadable record",
    }
}
