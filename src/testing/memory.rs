//! In-memory table source

use crate::error::ExportError;
use crate::source::{BatchStream, Field, RowBatch, TableSource};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A table held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Field>>,
    /// Fail with a connection error after this many batches
    pub fail_after: Option<usize>,
}

impl MemoryTable {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            fail_after: None,
        }
    }

    /// Make the stream lose its connection after `batches` batches
    pub fn failing_after(mut self, batches: usize) -> Self {
        self.fail_after = Some(batches);
        self
    }

    /// Append a row; `None` stands for `NULL`
    pub fn with_row(mut self, row: &[Option<&str>]) -> Self {
        self.rows
            .push(row.iter().map(|v| v.map(str::to_string)).collect());
        self
    }

    /// Append `count` generated rows of the form `(i, "row-i")`
    ///
    /// Only meaningful for two-column tables.
    pub fn with_generated_rows(mut self, count: usize) -> Self {
        for i in 0..count {
            self.rows
                .push(vec![Some(i.to_string()), Some(format!("row-{i}"))]);
        }
        self
    }
}

/// Table source backed by a map of in-memory tables
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    database: String,
    tables: BTreeMap<String, MemoryTable>,
    opened: Vec<String>,
}

impl MemorySource {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            tables: BTreeMap::new(),
            opened: Vec::new(),
        }
    }

    pub fn with_table(mut self, name: &str, table: MemoryTable) -> Self {
        self.tables.insert(name.to_string(), table);
        self
    }

    /// Names of the tables streamed so far, in order
    pub fn opened(&self) -> &[String] {
        &self.opened
    }
}

#[async_trait]
impl TableSource for MemorySource {
    fn database(&self) -> &str {
        &self.database
    }

    async fn table_exists(&mut self, table: &str) -> Result<bool, ExportError> {
        Ok(self.tables.contains_key(table))
    }

    async fn open_table<'a>(
        &'a mut self,
        table: &str,
        batch_size: usize,
    ) -> Result<Box<dyn BatchStream + 'a>, ExportError> {
        let data = self
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| ExportError::TableNotFound {
                table: table.to_string(),
                database: self.database.clone(),
            })?;
        self.opened.push(table.to_string());

        Ok(Box::new(MemoryBatchStream {
            columns: data.columns.into(),
            rows: data.rows.into_iter(),
            batch_size: batch_size.max(1),
            served: 0,
            fail_after: data.fail_after,
        }))
    }
}

/// Stream over a cloned in-memory table
pub struct MemoryBatchStream {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Field>>,
    batch_size: usize,
    served: usize,
    fail_after: Option<usize>,
}

#[async_trait]
impl BatchStream for MemoryBatchStream {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_batch(&mut self) -> Result<Option<RowBatch>, ExportError> {
        if self.fail_after == Some(self.served) {
            return Err(mysql_async::Error::Driver(mysql_async::DriverError::ConnectionClosed).into());
        }
        self.served += 1;

        let rows: Vec<_> = self.rows.by_ref().take(self.batch_size).collect();
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(RowBatch::new(self.columns.clone(), rows)))
    }
}
