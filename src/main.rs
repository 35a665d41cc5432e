use clap::error::ErrorKind;
use clap::Parser;
use std::time::Instant;
use table_export::config::{Cli, ExportConfig};
use table_export::error::ExportError;
use table_export::metrics::{self, MetricsReport};
use table_export::mysql::MySqlSource;
use table_export::pipeline::{self, RunReport};
use table_export::upload::S3Uploader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let started = Instant::now();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => std::process::exit(0),
                // Unparsable flags are configuration errors
                _ => std::process::exit(1),
            }
        }
    };

    let config = match ExportConfig::try_from(cli) {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    let mut report = RunReport::new(config.run_timestamp.clone());
    let outcome = execute(&config, &mut report).await;

    if let Some(path) = &config.emit_metrics {
        let metrics = MetricsReport::from_run(&report, outcome.as_ref().map(|_| ()), started.elapsed());
        metrics::emit(path, &metrics);
    }

    info!("Total run time: {:.2}s", started.elapsed().as_secs_f64());

    if let Err(e) = outcome {
        fail(e);
    }
}

async fn execute(config: &ExportConfig, report: &mut RunReport) -> Result<(), ExportError> {
    pipeline::prepare(config, report)?;

    let mut source = MySqlSource::connect(&config.mysql).await?;
    let uploader = S3Uploader::new(&config.upload).await?;

    let result = pipeline::run(config, &mut source, &uploader, report).await;

    if let Err(e) = source.disconnect().await {
        warn!("Failed to close MySQL connection: {e}");
    }
    result
}

fn fail(e: ExportError) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(e.exit_code())
}
