//! Command-line and environment configuration
//!
//! Every setting can be given as a flag or through the environment variable
//! named next to it. [`Cli`] holds the raw values; [`ExportConfig`] is the
//! validated configuration built once at startup and passed to each stage.

use crate::artifact::{parse_delimiter, run_timestamp, single_byte, CsvFormat, LineTerminator, QuoteMode};
use crate::error::ExportError;
use crate::source::DEFAULT_BATCH_SIZE;
use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;
use table_export_file::S3Settings;
use tracing::warn;

/// Region used when neither `AWS_DEFAULT_REGION` nor `AWS_REGION` is set
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Parser, Clone, Debug, Default)]
#[command(name = "table-export")]
#[command(about = "Export MySQL tables to CSV files and upload them to S3")]
#[command(long_about = None)]
pub struct Cli {
    /// MySQL host
    #[arg(long, default_value = "localhost", env = "MYSQL_HOST")]
    pub mysql_host: String,

    /// MySQL port
    #[arg(long, default_value = "3306", env = "MYSQL_PORT")]
    pub mysql_port: u16,

    /// MySQL database (schema) the tables live in
    #[arg(long, env = "MYSQL_DB")]
    pub mysql_db: Option<String>,

    /// MySQL username
    #[arg(long, env = "MYSQL_USER")]
    pub mysql_user: Option<String>,

    /// MySQL password
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    pub mysql_password: Option<String>,

    /// Tables to export (comma-separated)
    #[arg(long, env = "TABLES")]
    pub tables: Option<String>,

    /// CSV field delimiter (single character)
    #[arg(long, default_value = ",", env = "CSV_SEP")]
    pub csv_sep: String,

    /// CSV quoting mode: MINIMAL, ALL, NONNUMERIC or NONE
    #[arg(long, default_value = "MINIMAL", env = "CSV_QUOTE")]
    pub csv_quote: String,

    /// CSV line terminator (\n, \r\n, \r or a single character)
    #[arg(long, default_value = "\\n", env = "CSV_LINE_TERMINATOR")]
    pub csv_line_terminator: String,

    /// Escape character used when quoting is NONE
    #[arg(long, default_value = "\\", env = "CSV_ESCAPECHAR")]
    pub csv_escapechar: String,

    /// Maximum number of rows read per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, env = "CHUNKSIZE")]
    pub chunksize: usize,

    /// Directory the CSV files are written to
    #[arg(long, default_value = "/app/out", env = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Destination S3 bucket
    #[arg(long, env = "S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Key prefix for uploaded files
    #[arg(long, default_value = "", env = "S3_PREFIX")]
    pub s3_prefix: String,

    /// AWS region (falls back to AWS_REGION, then us-east-1)
    #[arg(long, env = "AWS_DEFAULT_REGION")]
    pub aws_region: Option<String>,

    /// Custom endpoint for S3-compatible stores
    #[arg(long, env = "S3_ENDPOINT_URL")]
    pub s3_endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long, env = "S3_FORCE_PATH_STYLE", value_parser = BoolishValueParser::new())]
    pub s3_force_path_style: bool,

    /// Export only - log the uploads instead of performing them
    #[arg(long, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
    pub dry_run: bool,

    /// Write a JSON run report to this path
    #[arg(long, value_name = "PATH", env = "EMIT_METRICS")]
    pub emit_metrics: Option<PathBuf>,
}

/// Connection settings for the source database
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MySqlSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

/// Where artifacts are uploaded to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadTarget {
    pub bucket: String,
    pub prefix: Option<String>,
    pub s3: S3Settings,
}

/// Validated configuration for one run
#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub mysql: MySqlSettings,
    pub tables: Vec<String>,
    pub csv: CsvFormat,
    pub batch_size: usize,
    pub output_dir: PathBuf,
    pub upload: UploadTarget,
    pub dry_run: bool,
    pub emit_metrics: Option<PathBuf>,
    /// `%Y%m%dT%H%M%SZ` timestamp shared by every artifact of the run
    pub run_timestamp: String,
}

/// Split a comma-separated table list, trimming names and dropping empties
pub fn parse_table_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<Cli> for ExportConfig {
    type Error = ExportError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let database = non_empty(cli.mysql_db);
        let user = non_empty(cli.mysql_user);
        let password = non_empty(cli.mysql_password);
        let tables = cli
            .tables
            .as_deref()
            .map(parse_table_list)
            .unwrap_or_default();
        let bucket = non_empty(cli.s3_bucket);

        let mut missing = Vec::new();
        if database.is_none() {
            missing.push("MYSQL_DB");
        }
        if user.is_none() {
            missing.push("MYSQL_USER");
        }
        if password.is_none() {
            missing.push("MYSQL_PASSWORD");
        }
        if tables.is_empty() {
            missing.push("TABLES");
        }
        if bucket.is_none() && !cli.dry_run {
            missing.push("S3_BUCKET");
        }
        if !missing.is_empty() {
            return Err(ExportError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if cli.chunksize == 0 {
            return Err(ExportError::Config(
                "CHUNKSIZE must be at least 1".to_string(),
            ));
        }

        let delimiter = parse_delimiter(&cli.csv_sep).map_err(ExportError::Config)?;
        let quoting = cli.csv_quote.parse::<QuoteMode>().unwrap_or_else(|e| {
            warn!("{e}, falling back to {}", QuoteMode::Minimal);
            QuoteMode::Minimal
        });
        let terminator = cli
            .csv_line_terminator
            .parse::<LineTerminator>()
            .map_err(ExportError::Config)?;
        let escape = single_byte(&cli.csv_escapechar).ok_or_else(|| {
            ExportError::Config(format!(
                "escape character must be a single ASCII character, got {:?}",
                cli.csv_escapechar
            ))
        })?;
        if escape == delimiter {
            return Err(ExportError::Config(
                "escape character must differ from the delimiter".to_string(),
            ));
        }
        if terminator.as_bytes().contains(&delimiter) {
            return Err(ExportError::Config(
                "line terminator must differ from the delimiter".to_string(),
            ));
        }

        let region = non_empty(cli.aws_region)
            .or_else(|| non_empty(std::env::var("AWS_REGION").ok()))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let s3 = S3Settings::new(region)
            .with_endpoint_url(non_empty(cli.s3_endpoint_url))
            .with_force_path_style(cli.s3_force_path_style);

        Ok(ExportConfig {
            mysql: MySqlSettings {
                host: cli.mysql_host,
                port: cli.mysql_port,
                database: database.unwrap_or_default(),
                user: user.unwrap_or_default(),
                password: password.unwrap_or_default(),
            },
            tables,
            csv: CsvFormat {
                delimiter,
                quoting,
                terminator,
                escape,
            },
            batch_size: cli.chunksize,
            output_dir: cli.output_dir,
            upload: UploadTarget {
                bucket: bucket.unwrap_or_default(),
                prefix: non_empty(Some(cli.s3_prefix)),
                s3,
            },
            dry_run: cli.dry_run,
            emit_metrics: cli.emit_metrics,
            run_timestamp: run_timestamp(chrono::Utc::now()),
        })
    }
}
