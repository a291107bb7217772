//! CSV writer for topic batches.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chatseg_types::Topic;
use tracing::{debug, info};

use crate::error::ExportError;

/// Check that a batch is non-empty and uniformly sized with at least 2
/// messages per topic. Returns the shared topic size.
pub fn validate_topics(topics: &[Topic]) -> Result<usize, ExportError> {
    let first = topics.first().ok_or(ExportError::EmptyBatch)?;
    let expected = first.len();
    if expected < 2 {
        return Err(ExportError::TopicTooSmall { size: expected });
    }

    if let Some((index, topic)) = topics
        .iter()
        .enumerate()
        .find(|(_, t)| t.len() != expected)
    {
        return Err(ExportError::SizeMismatch {
            index,
            expected,
            actual: topic.len(),
        });
    }
    Ok(expected)
}

/// Column names for topics of `topic_size` messages.
///
/// `context_{k}` down to `context_1`, then `response`, with
/// `k = topic_size - 1`.
pub fn header(topic_size: usize) -> Vec<String> {
    let k = topic_size.saturating_sub(1);
    (1..=k)
        .rev()
        .map(|i| format!("context_{i}"))
        .chain(std::iter::once("response".to_string()))
        .collect()
}

/// Write a validated batch to any writer. Returns the number of data rows.
pub fn write_topics<W: Write>(writer: W, topics: &[Topic]) -> Result<usize, ExportError> {
    let topic_size = validate_topics(topics)?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(header(topic_size))?;
    for topic in topics {
        csv_writer.write_record(topic.iter().map(|m| m.text.as_str()))?;
    }
    csv_writer.flush()?;

    debug!(rows = topics.len(), columns = topic_size, "Wrote topic rows");
    Ok(topics.len())
}

/// Export topics to a CSV file at `path`.
///
/// The batch is validated before the file is created, so a shape error
/// never leaves a partial file behind.
pub fn export_topics_csv(path: impl AsRef<Path>, topics: &[Topic]) -> Result<usize, ExportError> {
    let path = path.as_ref();
    validate_topics(topics)?;

    let file = File::create(path)?;
    let rows = write_topics(file, topics)?;
    info!(path = ?path, rows, "Exported topics");
    Ok(rows)
}
