//! Parsers for attendance source rows.
//!
//! # Parsers
//!
//! - [`record_parser`]: Turn one comma-separated row into an [`AttendanceEntry`]
//!
//! # Example
//!
//! ```
//! use presence_analyzer::parsing::{parse_record, SchemaVariant};
//!
//! let entry = parse_record(&["10", "2013-10-01", "09:00:00", "17:30:00"], SchemaVariant::Basic)
//!     .expect("well-formed row")
//!     .expect("data row");
//! assert_eq!(entry.subject_id, 10);
//! ```
//!
//! [`AttendanceEntry`]: crate::models::AttendanceEntry

pub mod record_parser;


pub use record_parser::{parse_record, SchemaVariant};
