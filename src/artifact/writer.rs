use super::escape::escape_field;
use super::format::{CsvFormat, QuoteMode};
use crate::error::ExportError;
use crate::source::RowBatch;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default buffer size for CSV writing.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Rows and bytes of a finished artifact file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenFile {
    pub rows: u64,
    pub bytes: u64,
}

/// Appends row batches of one table to a single CSV file.
///
/// The header is written together with the first batch, or by
/// [`ArtifactWriter::finish`] when no batch arrived, so it appears exactly
/// once per file.
pub struct ArtifactWriter {
    path: PathBuf,
    format: CsvFormat,
    writer: csv::Writer<BufWriter<File>>,
    header_written: bool,
    rows_written: u64,
}

impl ArtifactWriter {
    /// Create the file, or open it for appending if it already exists
    pub fn create(path: impl AsRef<Path>, format: CsvFormat) -> Result<Self, ExportError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ExportError::io(&path, e))?;
        let buf_writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let writer = format.writer_builder().from_writer(buf_writer);

        Ok(Self {
            path,
            format,
            writer,
            header_written: false,
            rows_written: 0,
        })
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Write the header unless it has already been written
    pub fn write_header(&mut self, columns: &[String]) -> Result<(), ExportError> {
        if self.header_written {
            return Ok(());
        }
        self.write_fields(columns.iter().map(String::as_str))?;
        self.header_written = true;
        Ok(())
    }

    /// Append one batch; the first batch also writes the header
    pub fn write_batch(&mut self, batch: &RowBatch) -> Result<(), ExportError> {
        self.write_header(batch.columns())?;

        for row in batch.rows() {
            self.write_fields(row.iter().map(|f| f.as_deref().unwrap_or("")))?;
            self.rows_written += 1;
        }

        Ok(())
    }

    fn write_fields<'a>(&mut self, fields: impl Iterator<Item = &'a str>) -> Result<(), ExportError> {
        let format = self.format;
        match format.quoting {
            QuoteMode::None => {
                let escaped: Vec<_> = fields.map(|f| escape_field(f, &format)).collect();
                if let [only] = escaped.as_slice() {
                    if only.is_empty() {
                        // csv quotes a lone empty field regardless of quote style
                        self.writer
                            .flush()
                            .map_err(|e| ExportError::io(&self.path, e))?;
                        // flushed above, so the buffer is empty; write to the file directly
                        let mut file: &File = self.writer.get_ref().get_ref();
                        file
                            .write_all(format.terminator.as_bytes())
                            .map_err(|e| ExportError::io(&self.path, e))?;
                        return Ok(());
                    }
                }
                self.writer
                    .write_record(escaped.iter().map(|f| f.as_bytes()))?;
            }
            _ => self.writer.write_record(fields)?,
        }
        Ok(())
    }

    /// Write the header if no batch did, flush, and report the file size
    pub fn finish(mut self, columns: &[String]) -> Result<WrittenFile, ExportError> {
        self.write_header(columns)?;
        self.writer
            .flush()
            .map_err(|e| ExportError::io(&self.path, e))?;
        drop(self.writer);

        let bytes = std::fs::metadata(&self.path)
            .map_err(|e| ExportError::io(&self.path, e))?
            .len();

        debug!(
            "Finished {}: {} rows, {} bytes",
            self.path.display(),
            self.rows_written,
            bytes
        );

        Ok(WrittenFile {
            rows: self.rows_written,
            bytes,
        })
    }
}
