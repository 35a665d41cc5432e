//! MySQL test cleanup utilities

use anyhow::Result;
use mysql_async::prelude::Queryable;

use crate::mysql::quote_identifier;

/// Drop the given tables if they exist
pub async fn cleanup_test_tables(conn: &mut mysql_async::Conn, tables: &[&str]) -> Result<()> {
    for table in tables {
        let _ = conn
            .query_drop(format!("DROP TABLE IF EXISTS {}", quote_identifier(table)))
            .await;
    }
    Ok(())
}
