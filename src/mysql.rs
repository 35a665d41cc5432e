//! MySQL table source
//!
//! Streams whole tables over the text protocol, one bounded batch at a time.

mod client;
mod schema;
mod source;
mod value;

pub use client::{mysql_opts, new_mysql_pool};
pub use schema::{quote_identifier, table_exists};
pub use source::{MySqlBatchStream, MySqlSource};
pub use value::{render_value, ColumnKind};
