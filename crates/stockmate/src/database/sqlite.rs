//! SQLite query runner

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use crate::types::{CellValue, QueryTable};

use super::{QueryError, QueryRunner};

/// Runs statements against a SQLite file opened read-only
pub struct SqliteRunner {
    path: PathBuf,
}

impl SqliteRunner {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, QueryError> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            tracing::error!("Failed to open {}: {}", self.path.display(), e);
            QueryError::Connection
        })
    }
}

fn cell_from(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Real(f),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => CellValue::Blob(bytes.to_vec()),
    }
}

fn query(conn: &Connection, sql: &str) -> rusqlite::Result<QueryTable> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let mut table = QueryTable::new(columns);

    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let cells = (0..width)
            .map(|i| row.get_ref(i).map(cell_from))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        table.rows.push(cells);
    }

    Ok(table)
}

#[async_trait]
impl QueryRunner for SqliteRunner {
    async fn run(&self, sql: &str) -> Result<QueryTable, QueryError> {
        let conn = self.connect()?;
        let sql = sql.to_string();

        // Connection is dropped when the blocking task ends
        tokio::task::spawn_blocking(move || query(&conn, &sql))
            .await
            .map_err(|e| QueryError::Query(format!("Query task failed: {}", e)))?
            .map_err(|e| QueryError::Query(e.to_string()))
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory_db() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE Inventory (
                entry_id INTEGER PRIMARY KEY,
                item_name TEXT NOT NULL,
                item_category TEXT,
                unit_price REAL,
                quantity INTEGER,
                employee_name TEXT
            );
            INSERT INTO Inventory VALUES (1, 'Laptop', 'Consumer Electronics', 999.5, 12, 'Asha');
            INSERT INTO Inventory VALUES (2, 'Desk', 'Furniture', 150.0, 4, NULL);
            "#,
        )
        .unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_run_returns_rows() {
        let (_dir, path) = inventory_db();
        let runner = SqliteRunner::new(&path);

        let table = runner
            .run("SELECT item_name, quantity, employee_name FROM Inventory ORDER BY entry_id")
            .await
            .unwrap();

        assert_eq!(table.columns, vec!["item_name", "quantity", "employee_name"]);
        assert_eq!(
            table.rows,
            vec![
                vec![
                    CellValue::Text("Laptop".into()),
                    CellValue::Integer(12),
                    CellValue::Text("Asha".into()),
                ],
                vec![
                    CellValue::Text("Desk".into()),
                    CellValue::Integer(4),
                    CellValue::Null,
                ],
            ]
        );
    }

    #[tokio::test]
    async fn test_run_zero_rows() {
        let (_dir, path) = inventory_db();
        let runner = SqliteRunner::new(&path);

        let table = runner
            .run("SELECT item_name FROM Inventory WHERE item_category LIKE '%Garden%'")
            .await
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["item_name"]);
    }

    #[tokio::test]
    async fn test_run_invalid_sql() {
        let (_dir, path) = inventory_db();
        let runner = SqliteRunner::new(&path);

        let err = runner.run("SELECT nope FROM Inventory").await.unwrap_err();
        match err {
            QueryError::Query(description) => assert!(description.contains("nope")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_is_read_only() {
        let (_dir, path) = inventory_db();
        let runner = SqliteRunner::new(&path);

        let result = runner.run("DELETE FROM Inventory").await;
        assert!(matches!(result, Err(QueryError::Query(_))));
    }

    #[tokio::test]
    async fn test_missing_database_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SqliteRunner::new(dir.path().join("missing.db"));

        let result = runner.run("SELECT 1").await;
        assert_eq!(result, Err(QueryError::Connection));
    }
}
