//! Streaming MySQL table source
//!
//! Rows are pulled from an open text-protocol result set on demand, so only
//! the current batch is held in memory regardless of table size.

use super::schema::{quote_identifier, table_exists};
use super::value::{render_value, ColumnKind};
use crate::config::MySqlSettings;
use crate::error::ExportError;
use crate::source::{BatchStream, Field, RowBatch, TableSource};
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Pool, QueryResult, Row, TextProtocol};
use std::sync::Arc;
use tracing::{debug, info};

/// Upper bound on rows preallocated per batch
const PREALLOCATE_ROWS: usize = 4096;

/// MySQL source holding one connection for the whole run
pub struct MySqlSource {
    pool: Pool,
    conn: Conn,
    database: String,
}

impl MySqlSource {
    /// Open the connection used for every table of the run
    pub async fn connect(settings: &MySqlSettings) -> Result<Self, ExportError> {
        let pool = super::client::new_mysql_pool(settings);
        let conn = pool.get_conn().await?;

        info!(
            "Connected to MySQL at {}:{} (database {})",
            settings.host, settings.port, settings.database
        );

        Ok(Self {
            pool,
            conn,
            database: settings.database.clone(),
        })
    }

    /// Release the connection and close the pool
    pub async fn disconnect(self) -> Result<(), ExportError> {
        drop(self.conn);
        self.pool.disconnect().await?;
        Ok(())
    }
}

#[async_trait]
impl TableSource for MySqlSource {
    fn database(&self) -> &str {
        &self.database
    }

    async fn table_exists(&mut self, table: &str) -> Result<bool, ExportError> {
        table_exists(&mut self.conn, &self.database, table).await
    }

    async fn open_table<'a>(
        &'a mut self,
        table: &str,
        batch_size: usize,
    ) -> Result<Box<dyn BatchStream + 'a>, ExportError> {
        let query = format!("SELECT * FROM {}", quote_identifier(table));
        debug!("Opening stream: {query}");

        let result = self.conn.query_iter(query).await?;
        Ok(Box::new(MySqlBatchStream::new(result, batch_size)))
    }
}

/// Batch stream over an open result set
pub struct MySqlBatchStream<'a> {
    result: QueryResult<'a, 'static, TextProtocol>,
    columns: Arc<[String]>,
    kinds: Vec<ColumnKind>,
    batch_size: usize,
    done: bool,
}

impl<'a> MySqlBatchStream<'a> {
    fn new(result: QueryResult<'a, 'static, TextProtocol>, batch_size: usize) -> Self {
        let meta = result.columns_ref();
        let columns: Arc<[String]> = meta
            .iter()
            .map(|c| c.name_str().into_owned())
            .collect::<Vec<_>>()
            .into();
        let kinds = meta.iter().map(ColumnKind::of).collect();

        Self {
            result,
            columns,
            kinds,
            batch_size,
            done: false,
        }
    }

    fn row_to_fields(&self, row: &Row) -> Vec<Field> {
        (0..row.len())
            .map(|index| {
                let kind = self.kinds.get(index).copied().unwrap_or(ColumnKind::Text);
                row.as_ref(index).and_then(|value| render_value(value, kind))
            })
            .collect()
    }
}

#[async_trait]
impl<'a> BatchStream for MySqlBatchStream<'a> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_batch(&mut self) -> Result<Option<RowBatch>, ExportError> {
        if self.done {
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(self.batch_size.min(PREALLOCATE_ROWS));
        while rows.len() < self.batch_size {
            match self.result.next().await? {
                Some(row) => rows.push(self.row_to_fields(&row)),
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(RowBatch::new(self.columns.clone(), rows)))
    }
}
