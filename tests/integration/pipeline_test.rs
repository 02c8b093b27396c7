//! End-to-end extraction runs against a SQLite fixture.

use super::common::{
    create_database_without_t2, create_fixture, settings_in, sqlite_connection, EXPECTED_IDS,
    TRANSACTIONS,
};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;
use txn_extract::error::ExtractError;
use txn_extract::pipeline;
use txn_extract::query::FILTERED_TRANSACTIONS;

const EXPECTED_CSV: &str = "txn_id,source_ac,destination_ac,amount,txn_date\n\
                            8,BX400,AC009,1000.01,2024-08-20 18:00:00\n\
                            2,BX100,AC002,2500.5,2024-03-01 12:30:00\n\
                            6,AC004,AC005,1200.25,2024-02-15 16:45:00\n\
                            1,AC001,BX900,1500.0,2024-01-10 09:00:00\n";

#[tokio::test]
async fn test_extracts_filtered_rows_newest_first() {
    let dir = tempdir().unwrap();
    let db_path = create_fixture(dir.path(), TRANSACTIONS).await;
    let settings = settings_in(&dir, "small_output.csv");
    let mut out: Vec<u8> = Vec::new();

    let summary = pipeline::run(&sqlite_connection(&db_path), &settings, &mut out)
        .await
        .unwrap();

    assert_eq!(summary.row_count, EXPECTED_IDS.len());
    assert_eq!(summary.column_count, 5);
    assert_eq!(summary.output_path, settings.export.path);

    let csv = fs::read_to_string(&settings.export.path).unwrap();
    assert_eq!(csv, EXPECTED_CSV);

    let ids: Vec<i64> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(ids, EXPECTED_IDS);
}

#[tokio::test]
async fn test_console_output_layout() {
    let dir = tempdir().unwrap();
    let db_path = create_fixture(dir.path(), TRANSACTIONS).await;
    let settings = settings_in(&dir, "small_output.csv");
    let mut out: Vec<u8> = Vec::new();

    pipeline::run(&sqlite_connection(&db_path), &settings, &mut out)
        .await
        .unwrap();

    let console = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = console.lines().collect();

    assert_eq!(lines[0], FILTERED_TRANSACTIONS.title);
    assert!(lines[1].contains("txn_id"));
    assert!(lines[1].contains("destination_ac"));
    assert!(lines[3].starts_with("0 │ 8 "));
    assert!(lines[6].starts_with("3 │ 1 "));
    assert_eq!(lines[7], "[4 rows x 5 columns]");
    assert_eq!(lines[8], "");
    assert!(lines[9].starts_with("Query execution time: "));
    assert!(lines[9].ends_with(" seconds"));
    assert_eq!(lines.len(), 10);
}

#[tokio::test]
async fn test_no_matches_writes_header_only() {
    let dir = tempdir().unwrap();
    let db_path = create_fixture(dir.path(), &TRANSACTIONS[2..5]).await;
    let settings = settings_in(&dir, "small_output.csv");
    let mut out: Vec<u8> = Vec::new();

    let summary = pipeline::run(&sqlite_connection(&db_path), &settings, &mut out)
        .await
        .unwrap();

    assert_eq!(summary.row_count, 0);
    assert_eq!(
        fs::read_to_string(&settings.export.path).unwrap(),
        "txn_id,source_ac,destination_ac,amount,txn_date\n"
    );
    let console = String::from_utf8(out).unwrap();
    assert!(console.contains("(0 rows)"));
    assert!(console.contains("[0 rows x 5 columns]"));
}

#[tokio::test]
async fn test_rerun_produces_identical_file() {
    let dir = tempdir().unwrap();
    let db_path = create_fixture(dir.path(), TRANSACTIONS).await;
    let connection = sqlite_connection(&db_path);
    let settings = settings_in(&dir, "small_output.csv");

    pipeline::run(&connection, &settings, &mut std::io::sink())
        .await
        .unwrap();
    let first = fs::read(&settings.export.path).unwrap();

    pipeline::run(&connection, &settings, &mut std::io::sink())
        .await
        .unwrap();
    let second = fs::read(&settings.export.path).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_custom_delimiter_and_path() {
    let dir = tempdir().unwrap();
    let db_path = create_fixture(dir.path(), TRANSACTIONS).await;
    let mut settings = settings_in(&dir, "extract.tsv");
    settings.export.delimiter = '\t';

    pipeline::run(&sqlite_connection(&db_path), &settings, &mut std::io::sink())
        .await
        .unwrap();

    let tsv = fs::read_to_string(dir.path().join("extract.tsv")).unwrap();
    assert_eq!(tsv, EXPECTED_CSV.replace(',', "\t"));
    assert!(!dir.path().join("small_output.csv").exists());
}

#[tokio::test]
async fn test_missing_table_fails_without_output() {
    let dir = tempdir().unwrap();
    let db_path = create_database_without_t2(dir.path()).await;
    let settings = settings_in(&dir, "small_output.csv");
    let mut out: Vec<u8> = Vec::new();

    let error = pipeline::run(&sqlite_connection(&db_path), &settings, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(error, ExtractError::Query(_)));
    assert!(error.to_string().contains("t2"));
    assert!(out.is_empty());
    assert!(!settings.export.path.exists());
}

#[tokio::test]
async fn test_unwritable_output_is_export_error() {
    let dir = tempdir().unwrap();
    let db_path = create_fixture(dir.path(), TRANSACTIONS).await;
    let mut settings = settings_in(&dir, "small_output.csv");
    settings.export.path = dir.path().join("no_such_dir").join("small_output.csv");

    let error = pipeline::run(&sqlite_connection(&db_path), &settings, &mut std::io::sink())
        .await
        .unwrap_err();

    assert!(matches!(error, ExtractError::Export(_)));
    assert!(!settings.export.path.exists());
}
