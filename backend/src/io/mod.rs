//! Attendance source loading.
//!
//! Combines the row parser with file access and folds the parsed rows into an
//! [`AttendanceStore`](crate::models::AttendanceStore).
//!
//! # Example
//!
//! ```no_run
//! use presence_analyzer::io::AttendanceLoader;
//! use presence_analyzer::parsing::SchemaVariant;
//! use std::path::Path;
//!
//! let path = Path::new("runtime/data/sample_data.csv");
//! let store = AttendanceLoader::load_from_file(path, SchemaVariant::Basic)
//!     .expect("Failed to load");
//! println!("Loaded {} subjects", store.len());
//! ```

pub mod loaders;


pub use loaders::{ingest, ingest_reader, AttendanceLoader, IngestReport};
