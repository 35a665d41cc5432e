//! MySQL schema lookups

use crate::error::ExportError;
use mysql_async::prelude::*;

const TABLE_EXISTS_QUERY: &str = "
    SELECT COUNT(*)
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = ?
    AND TABLE_NAME = ?";

/// Check whether `table` exists in `database`
pub async fn table_exists(
    conn: &mut mysql_async::Conn,
    database: &str,
    table: &str,
) -> Result<bool, ExportError> {
    let count: Option<i64> = conn.exec_first(TABLE_EXISTS_QUERY, (database, table)).await?;
    Ok(count.unwrap_or(0) > 0)
}

/// Quote a table name as a MySQL identifier
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "`users`");
        assert_eq!(quote_identifier("order items"), "`order items`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }
}
