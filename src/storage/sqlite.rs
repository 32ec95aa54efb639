//! SQLite archive session for local snapshots and tests

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params, Connection};

use super::{ArchiveSession, Dialect, Param, QueryError, ResultSet, Value};

/// Session against a SQLite copy of the archive
///
/// Uses `Mutex` to serialize access to the single connection.
pub struct SqliteArchive {
    conn: Mutex<Connection>,
}

impl SqliteArchive {
    /// Open (or create) an archive file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, QueryError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    QueryError::Connection(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        let archive = Self {
            conn: Mutex::new(conn),
        };
        archive.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite archive opened");
        Ok(archive)
    }

    /// Create an in-memory archive (for testing)
    pub fn in_memory() -> Result<Self, QueryError> {
        let conn = Connection::open_in_memory()?;
        let archive = Self {
            conn: Mutex::new(conn),
        };
        archive.create_schema()?;
        Ok(archive)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, QueryError> {
        self.conn
            .lock()
            .map_err(|_| QueryError::Connection("SQLite connection mutex poisoned".to_string()))
    }

    /// Create the `articles` table mirroring the production archive columns
    fn create_schema(&self) -> Result<(), QueryError> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS articles (
                    id INTEGER PRIMARY KEY,
                    title TEXT,
                    section TEXT,
                    author TEXT,
                    publication_date TEXT,
                    body TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_articles_publication_date
                    ON articles(publication_date);
                "#,
        )?;
        Ok(())
    }

    /// Insert an article; `publication_date` is stored as ISO text
    pub fn insert_article(
        &self,
        id: i64,
        title: &str,
        section: Option<&str>,
        publication_date: &str,
        body: &str,
    ) -> Result<(), QueryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO articles (id, title, section, publication_date, body)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, title, section, publication_date, body],
        )?;
        Ok(())
    }

    /// Insert an article whose body is stored as raw bytes
    pub fn insert_article_bytes(
        &self,
        id: i64,
        publication_date: &str,
        body: &[u8],
    ) -> Result<(), QueryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO articles (id, title, publication_date, body)
             VALUES (?1, '', ?2, ?3)",
            params![id, publication_date, body],
        )?;
        Ok(())
    }
}

fn to_sql_value(param: &Param) -> SqlValue {
    match param {
        Param::Int(v) => SqlValue::Integer(*v),
        Param::Float(v) => SqlValue::Real(*v),
        Param::Text(v) => SqlValue::Text(v.clone()),
    }
}

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        // Undecodable text is kept as bytes so tokenization can report it
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::Text(text.to_string()),
            Err(_) => Value::Bytes(bytes.to_vec()),
        },
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}

#[async_trait]
impl ArchiveSession for SqliteArchive {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn query(&self, sql: &str, params: &[Param]) -> Result<ResultSet, QueryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();
        let mut result = ResultSet::new(columns);

        let values: Vec<SqlValue> = params.iter().map(to_sql_value).collect();
        let mut rows = stmt.query(rusqlite::params_from_iter(values.iter()))?;

        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(width);
            for idx in 0..width {
                record.push(column_value(row.get_ref(idx)?));
            }
            result.push(record);
        }

        tracing::debug!(rows = result.len(), "SQLite query completed");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_roundtrip() {
        let archive = SqliteArchive::in_memory().unwrap();
        archive
            .insert_article(1, "Título", Some("estado"), "2020-01-05 10:00:00", "cuerpo")
            .unwrap();

        let set = archive
            .query(
                "SELECT id, title, body FROM articles WHERE id = ?1",
                &[Param::Int(1)],
            )
            .await
            .unwrap();

        assert_eq!(set.len(), 1);
        let row = set.first().unwrap();
        assert_eq!(row.get::<i64>("id").unwrap(), 1);
        assert_eq!(row.get::<String>("title").unwrap(), "Título");
    }

    #[tokio::test]
    async fn test_invalid_utf8_text_becomes_bytes() {
        let archive = SqliteArchive::in_memory().unwrap();
        archive
            .insert_article_bytes(2, "2020-01-05", &[0x66, 0xff, 0xfe])
            .unwrap();

        let set = archive
            .query("SELECT CAST(body AS TEXT) AS body FROM articles", &[])
            .await
            .unwrap();
        assert!(matches!(set.first().unwrap().value("body").unwrap(), Value::Bytes(_)));
    }

    #[tokio::test]
    async fn test_syntax_error_is_query_error() {
        let archive = SqliteArchive::in_memory().unwrap();
        let err = archive.query("SELEC nothing", &[]).await.unwrap_err();
        assert!(matches!(err, QueryError::Sqlite(_)));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("archive.db");
        assert!(SqliteArchive::open(&path).is_ok());
        assert!(path.exists());
    }
}
