//! Table Export
//!
//! Exports MySQL tables to CSV files and uploads them to S3.
//!
//! A run reads every configured table with a streaming, batched query and
//! writes one CSV file per table into a local output directory. Once all
//! tables are exported, the files are uploaded to an S3 bucket under an
//! optional key prefix. Missing tables are skipped; any other failure ends
//! the run with a non-zero exit code (see [`error::ExportError::exit_code`]).
//!
//! # CLI Usage
//!
//! ```bash
//! table-export --mysql-db shop --mysql-user export --mysql-password ... \
//!     --tables users,orders --s3-bucket my-exports --s3-prefix daily/
//!
//! # Everything can also come from the environment
//! MYSQL_DB=shop MYSQL_USER=export MYSQL_PASSWORD=... TABLES=users,orders \
//!     S3_BUCKET=my-exports CSV_SEP=';' CSV_QUOTE=ALL table-export
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod metrics;
pub mod mysql;
pub mod pipeline;
pub mod source;
pub mod testing;
pub mod upload;
