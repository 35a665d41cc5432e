//! Table sources and batch streams
//!
//! A [`TableSource`] answers whether a table exists and opens a
//! [`BatchStream`] over all of its rows. Streams are pull-based: the CSV
//! writer asks for the next batch only after it has written the previous
//! one, so at most one batch is held in memory at a time.

use crate::error::ExportError;
use async_trait::async_trait;
use std::sync::Arc;

/// Default upper bound on the number of rows per batch
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

/// A single field value; `None` is SQL `NULL`
pub type Field = Option<String>;

/// A bounded, ordered slice of a table's rows
#[derive(Debug, Clone, PartialEq)]
pub struct RowBatch {
    columns: Arc<[String]>,
    rows: Vec<Vec<Field>>,
}

impl RowBatch {
    pub fn new(columns: Arc<[String]>, rows: Vec<Vec<Field>>) -> Self {
        Self { columns, rows }
    }

    /// Column names, identical in order for every batch of a table
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Field>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lazy, finite, non-restartable sequence of row batches for one table
///
/// Implementations return at most the configured number of rows per batch
/// and keep returning `Ok(None)` once the rows are exhausted.
#[async_trait]
pub trait BatchStream: Send {
    /// Column names in source order, available before the first batch
    fn columns(&self) -> &[String];

    /// Pull the next batch, or `None` once the table has been fully read
    async fn next_batch(&mut self) -> Result<Option<RowBatch>, ExportError>;
}

/// A relational source that can stream whole tables
#[async_trait]
pub trait TableSource: Send {
    /// Name of the schema tables are looked up in, for diagnostics
    fn database(&self) -> &str;

    /// Check whether `table` exists in the configured schema
    async fn table_exists(&mut self, table: &str) -> Result<bool, ExportError>;

    /// Open a stream over all columns and rows of `table`
    async fn open_table<'a>(
        &'a mut self,
        table: &str,
        batch_size: usize,
    ) -> Result<Box<dyn BatchStream + 'a>, ExportError>;
}

/// Number of batches a stream yields for `rows` rows under bound `batch_size`
pub fn expected_batches(rows: u64, batch_size: usize) -> u64 {
    if batch_size == 0 {
        return 0;
    }
    rows.div_ceil(batch_size as u64)
}
