use super::escape::split_records;
use super::format::{CsvFormat, QuoteMode};
use crate::error::ExportError;
use std::path::Path;

/// Header and data rows parsed back from an artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArtifact {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse an artifact with the dialect it was written with
///
/// `NULL` fields come back as empty strings.
pub fn read_artifact(path: impl AsRef<Path>, format: &CsvFormat) -> Result<ParsedArtifact, ExportError> {
    let path = path.as_ref();

    let mut records = match format.quoting {
        QuoteMode::None => {
            let contents =
                std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
            split_records(&contents, format)
        }
        _ => {
            let mut reader = format.reader_builder().from_path(path)?;
            let mut records = Vec::new();
            for result in reader.records() {
                let record = result?;
                records.push(record.iter().map(str::to_string).collect());
            }
            records
        }
    }
    .into_iter();

    let header = records.next().unwrap_or_default();
    Ok(ParsedArtifact {
        header,
        rows: records.collect(),
    })
}
