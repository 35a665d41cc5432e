//! Shared helpers for integration tests

use crate::artifact::{run_timestamp, CsvFormat};
use crate::config::{ExportConfig, MySqlSettings, UploadTarget, DEFAULT_REGION};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use table_export_file::S3Settings;

// Unique identifiers for tests running in parallel
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique test identifier for parallel test execution
pub fn generate_test_id() -> u64 {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    timestamp.wrapping_add(counter)
}

/// Connection settings for tests against a live MySQL server
///
/// Read from `MYSQL_HOST`, `MYSQL_PORT`, `MYSQL_DB`, `MYSQL_USER` and
/// `MYSQL_PASSWORD`, defaulting to the DevContainer's server.
#[derive(Clone, Debug)]
pub struct TestConfig {
    pub mysql: MySqlSettings,
}

impl TestConfig {
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_string());
        TestConfig {
            mysql: MySqlSettings {
                host: var("MYSQL_HOST", "mysql"),
                port: var("MYSQL_PORT", "3306").parse().unwrap_or(3306),
                database: var("MYSQL_DB", "testdb"),
                user: var("MYSQL_USER", "root"),
                password: var("MYSQL_PASSWORD", "root"),
            },
        }
    }
}

/// Export configuration writing into `output_dir` with default CSV settings
pub fn test_export_config(output_dir: &Path, tables: &[&str]) -> ExportConfig {
    ExportConfig {
        mysql: MySqlSettings {
            host: "localhost".to_string(),
            port: 3306,
            database: "app".to_string(),
            user: "export".to_string(),
            password: "secret".to_string(),
        },
        tables: tables.iter().map(|t| t.to_string()).collect(),
        csv: CsvFormat::default(),
        batch_size: 2,
        output_dir: output_dir.to_path_buf(),
        upload: UploadTarget {
            bucket: "exports".to_string(),
            prefix: Some("daily/".to_string()),
            s3: S3Settings::new(DEFAULT_REGION),
        },
        dry_run: false,
        emit_metrics: None,
        run_timestamp: run_timestamp(chrono::Utc::now()),
    }
}
