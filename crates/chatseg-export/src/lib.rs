//! Tabular export of segmented topics.
//!
//! Each topic becomes one CSV row: the context messages oldest first,
//! followed by the response.

pub mod csv_export;
pub mod error;

pub use csv_export::{export_topics_csv, header, validate_topics, write_topics};
pub use error::ExportError;
