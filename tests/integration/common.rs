//! Shared fixtures.

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, Executor};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use txn_extract::config::{ConnectionConfig, DisplayConfig, ExportConfig};
use txn_extract::db::DatabaseBackend;
use txn_extract::pipeline::RunSettings;

/// Rows inserted by [`create_fixture`]:
/// `(txn_id, source_ac, destination_ac, amount, txn_date)`.
pub const TRANSACTIONS: &[(i64, &str, &str, f64, &str)] = &[
    (1, "AC001", "BX900", 1500.0, "2024-01-10 09:00:00"),
    (2, "BX100", "AC002", 2500.5, "2024-03-01 12:30:00"),
    (3, "AC003", "BX901", 999.99, "2024-04-01 08:00:00"),
    (4, "BX200", "BX300", 5000.0, "2024-05-01 10:00:00"),
    (5, "AC010", "BX902", 1000.0, "2024-06-01 11:00:00"),
    (6, "AC004", "AC005", 1200.25, "2024-02-15 16:45:00"),
    (7, "AX001", "BX903", 3000.0, "2024-07-01 07:15:00"),
    (8, "BX400", "AC009", 1000.01, "2024-08-20 18:00:00"),
];

/// Transaction ids the extraction should return, newest first.
pub const EXPECTED_IDS: &[i64] = &[8, 2, 6, 1];

/// Creates `t2` in a fresh SQLite file and fills it with `rows`.
pub async fn create_fixture(dir: &Path, rows: &[(i64, &str, &str, f64, &str)]) -> PathBuf {
    let path = dir.join("bank.db");
    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();

    conn.execute(
        "CREATE TABLE t2 (
            txn_id INTEGER PRIMARY KEY,
            source_ac TEXT NOT NULL,
            destination_ac TEXT NOT NULL,
            amount REAL NOT NULL,
            txn_date TEXT NOT NULL
        )",
    )
    .await
    .unwrap();

    for &(id, source, destination, amount, date) in rows {
        sqlx::query("INSERT INTO t2 VALUES (?, ?, ?, ?, ?)")
            .bind(id)
            .bind(source)
            .bind(destination)
            .bind(amount)
            .bind(date)
            .execute(&mut conn)
            .await
            .unwrap();
    }

    conn.close().await.unwrap();
    path
}

/// Creates a SQLite file that holds an unrelated table but no `t2`.
pub async fn create_database_without_t2(dir: &Path) -> PathBuf {
    let path = dir.join("other.db");
    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();
    conn.execute("CREATE TABLE accounts (id TEXT PRIMARY KEY)")
        .await
        .unwrap();
    conn.close().await.unwrap();
    path
}

pub fn sqlite_connection(path: &Path) -> ConnectionConfig {
    ConnectionConfig {
        backend: DatabaseBackend::Sqlite,
        database: Some(path.display().to_string()),
        ..Default::default()
    }
}

pub fn settings_in(dir: &TempDir, file_name: &str) -> RunSettings {
    RunSettings {
        export: ExportConfig {
            path: dir.path().join(file_name),
            ..Default::default()
        },
        display: DisplayConfig::default(),
    }
}
