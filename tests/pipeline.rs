//! End-to-end runs of the export pipeline against in-memory fakes

use table_export::artifact::{read_artifact, CsvFormat};
use table_export::error::ExportError;
use table_export::pipeline::{self, RunPhase, RunReport};
use table_export::source::expected_batches;
use table_export::testing::{
    test_export_config, InjectedFailure, MemorySource, MemoryTable, RecordingUploader,
};
use tempfile::TempDir;

fn two_table_source() -> MemorySource {
    MemorySource::new("app")
        .with_table(
            "a",
            MemoryTable::new(&["id", "name"])
                .with_row(&[Some("1"), Some("alice")])
                .with_row(&[Some("2"), None]),
        )
        .with_table(
            "b",
            MemoryTable::new(&["id", "name"]).with_row(&[Some("3"), Some("carol, jr")]),
        )
}

#[tokio::test]
async fn test_missing_table_is_skipped() {
    let dir = TempDir::new().unwrap();
    let config = test_export_config(dir.path(), &["a", "missing", "b"]);
    let mut source = two_table_source();
    let uploader = RecordingUploader::new("exports", Some("daily/"));
    let mut report = RunReport::new(config.run_timestamp.clone());

    pipeline::run(&config, &mut source, &uploader, &mut report)
        .await
        .unwrap();

    assert_eq!(report.phase, RunPhase::Done);
    assert_eq!(report.skipped, vec!["missing".to_string()]);
    assert_eq!(source.opened(), ["a".to_string(), "b".to_string()]);
    assert_eq!(uploader.attempts(), vec!["a".to_string(), "b".to_string()]);

    let tables: Vec<_> = report.exported.iter().map(|a| a.table.as_str()).collect();
    assert_eq!(tables, vec!["a", "b"]);
    for artifact in &report.exported {
        assert!(artifact.path.is_file());
    }

    let keys: Vec<_> = report.uploaded.iter().map(|o| o.key.clone()).collect();
    assert_eq!(
        keys,
        vec![
            format!("daily/a_{}.csv", config.run_timestamp),
            format!("daily/b_{}.csv", config.run_timestamp),
        ]
    );
}

#[tokio::test]
async fn test_all_tables_missing_fails_without_uploading() {
    let dir = TempDir::new().unwrap();
    let config = test_export_config(dir.path(), &["x", "y"]);
    let mut source = two_table_source();
    let uploader = RecordingUploader::new("exports", None);
    let mut report = RunReport::new(config.run_timestamp.clone());

    let err = pipeline::run(&config, &mut source, &uploader, &mut report)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::EmptyResult {
            configured: 2,
            skipped: 2,
            ..
        }
    ));
    assert_eq!(err.exit_code(), 2);
    assert!(uploader.attempts().is_empty());
    assert_eq!(report.phase, RunPhase::Exporting);
}

#[tokio::test]
async fn test_auth_failure_stops_remaining_uploads() {
    let dir = TempDir::new().unwrap();
    let config = test_export_config(dir.path(), &["a", "b"]);
    let mut source = two_table_source();
    let uploader =
        RecordingUploader::new("exports", None).failing_at(0, InjectedFailure::Auth);
    let mut report = RunReport::new(config.run_timestamp.clone());

    let err = pipeline::run(&config, &mut source, &uploader, &mut report)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Auth(_)));
    assert_eq!(err.exit_code(), 5);
    assert_eq!(uploader.attempts(), vec!["a".to_string()]);
    assert!(report.uploaded.is_empty());
    assert_eq!(report.phase, RunPhase::Uploading);

    // Both artifacts were produced before uploading started
    assert_eq!(report.exported.len(), 2);
}

#[tokio::test]
async fn test_transfer_failure_keeps_earlier_uploads() {
    let dir = TempDir::new().unwrap();
    let config = test_export_config(dir.path(), &["a", "b"]);
    let mut source = two_table_source();
    let uploader =
        RecordingUploader::new("exports", None).failing_at(1, InjectedFailure::Transfer);
    let mut report = RunReport::new(config.run_timestamp.clone());

    let err = pipeline::run(&config, &mut source, &uploader, &mut report)
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 6);
    assert_eq!(uploader.attempts(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(report.uploaded.len(), 1);
    assert_eq!(
        report.uploaded[0].key,
        format!("a_{}.csv", config.run_timestamp)
    );
}

#[tokio::test]
async fn test_artifacts_share_run_timestamp() {
    let dir = TempDir::new().unwrap();
    let config = test_export_config(dir.path(), &["a", "b"]);
    let mut source = two_table_source();
    let uploader = RecordingUploader::new("exports", None);
    let mut report = RunReport::new(config.run_timestamp.clone());

    pipeline::run(&config, &mut source, &uploader, &mut report)
        .await
        .unwrap();

    let suffix = format!("_{}.csv", config.run_timestamp);
    for artifact in &report.exported {
        let name = artifact.file_name().unwrap();
        assert_eq!(name, format!("{}{}", artifact.table, suffix));
        assert_eq!(artifact.path.parent(), Some(dir.path()));
    }
}

#[tokio::test]
async fn test_dry_run_skips_uploads() {
    let dir = TempDir::new().unwrap();
    let mut config = test_export_config(dir.path(), &["a", "b"]);
    config.dry_run = true;
    let mut source = two_table_source();
    let uploader = RecordingUploader::new("exports", None);
    let mut report = RunReport::new(config.run_timestamp.clone());

    pipeline::run(&config, &mut source, &uploader, &mut report)
        .await
        .unwrap();

    assert_eq!(report.phase, RunPhase::Done);
    assert_eq!(report.exported.len(), 2);
    assert!(uploader.attempts().is_empty());
    assert!(report.uploaded.is_empty());
}

#[tokio::test]
async fn test_output_dir_is_created() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("nested").join("out");
    let config = test_export_config(&output, &["a"]);
    let mut source = two_table_source();
    let uploader = RecordingUploader::new("exports", None);
    let mut report = RunReport::new(config.run_timestamp.clone());

    pipeline::run(&config, &mut source, &uploader, &mut report)
        .await
        .unwrap();

    assert!(output.is_dir());
    assert!(report.exported[0].path.starts_with(&output));
}

#[tokio::test]
async fn test_batch_counts_and_single_header() {
    let dir = TempDir::new().unwrap();
    let mut config = test_export_config(dir.path(), &["empty", "one", "many"]);
    config.batch_size = 4;
    let mut source = MemorySource::new("app")
        .with_table("empty", MemoryTable::new(&["id", "name"]))
        .with_table("one", MemoryTable::new(&["id", "name"]).with_generated_rows(1))
        .with_table("many", MemoryTable::new(&["id", "name"]).with_generated_rows(12));
    let uploader = RecordingUploader::new("exports", None);
    let mut report = RunReport::new(config.run_timestamp.clone());

    pipeline::run(&config, &mut source, &uploader, &mut report)
        .await
        .unwrap();

    let expected_rows = [0u64, 1, 12];
    for (artifact, rows) in report.exported.iter().zip(expected_rows) {
        assert_eq!(artifact.rows, rows, "{}", artifact.table);
        assert_eq!(
            artifact.batches,
            expected_batches(rows, config.batch_size),
            "{}",
            artifact.table
        );

        let text = std::fs::read_to_string(&artifact.path).unwrap();
        assert_eq!(text.matches("id,name\n").count(), 1, "{}", artifact.table);
        assert!(text.starts_with("id,name\n"));

        let parsed = read_artifact(&artifact.path, &CsvFormat::default()).unwrap();
        assert_eq!(parsed.header, vec!["id", "name"]);
        assert_eq!(parsed.rows.len() as u64, rows);
    }

    let many = &report.exported[2];
    assert_eq!(many.batches, 3);
    let parsed = read_artifact(&many.path, &CsvFormat::default()).unwrap();
    assert_eq!(parsed.rows[11], vec!["11", "row-11"]);
}

#[tokio::test]
async fn test_artifact_contents() {
    let dir = TempDir::new().unwrap();
    let config = test_export_config(dir.path(), &["a", "b"]);
    let mut source = two_table_source();
    let uploader = RecordingUploader::new("exports", None);
    let mut report = RunReport::new(config.run_timestamp.clone());

    pipeline::run(&config, &mut source, &uploader, &mut report)
        .await
        .unwrap();

    let a = std::fs::read_to_string(&report.exported[0].path).unwrap();
    assert_eq!(a, "id,name\n1,alice\n2,\n");
    let b = std::fs::read_to_string(&report.exported[1].path).unwrap();
    assert_eq!(b, "id,name\n3,\"carol, jr\"\n");
}

#[tokio::test]
async fn test_source_failure_aborts_run() {
    let dir = TempDir::new().unwrap();
    let mut config = test_export_config(dir.path(), &["a", "bad", "b"]);
    config.batch_size = 1;
    let mut source = two_table_source().with_table(
        "bad",
        MemoryTable::new(&["id", "name"])
            .with_generated_rows(3)
            .failing_after(1),
    );
    let uploader = RecordingUploader::new("exports", None);
    let mut report = RunReport::new(config.run_timestamp.clone());

    let err = pipeline::run(&config, &mut source, &uploader, &mut report)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Connection(_)));
    assert!(!err.is_recoverable());
    assert_eq!(err.exit_code(), 3);
    assert_eq!(source.opened(), ["a".to_string(), "bad".to_string()]);
    assert!(uploader.attempts().is_empty());
    assert!(report.skipped.is_empty());
    assert_eq!(report.exported.len(), 1);
    assert_eq!(report.phase, RunPhase::Exporting);
}

#[tokio::test]
async fn test_unwritable_output_dir_fails_before_export() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let config = test_export_config(&blocker.join("out"), &["a"]);
    let mut report = RunReport::new(config.run_timestamp.clone());

    let err = pipeline::prepare(&config, &mut report).unwrap_err();

    assert!(matches!(err, ExportError::Io { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(report.phase, RunPhase::Exporting);
}
