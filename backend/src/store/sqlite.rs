use super::DocumentStore;
use crate::error::StoreError;
use common::model::upload::UploadRecord;
use log::debug;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS collections (
        name       TEXT PRIMARY KEY,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE IF NOT EXISTS documents (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        collection TEXT NOT NULL REFERENCES collections(name),
        body       TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS documents_collection ON documents(collection);
    CREATE TABLE IF NOT EXISTS uploaded_files (
        file_hash   TEXT PRIMARY KEY,
        uploaded_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
";

/// Document store kept in a single SQLite database.
///
/// Documents are stored as JSON text. The connection is opened once when the server
/// starts and shared by every request behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure the tables exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl DocumentStore for SqliteStore {
    fn collection_exists(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        match conn.query_row(
            "SELECT 1 FROM collections WHERE name = ?1",
            params![name],
            |_| Ok(()),
        ) {
            Ok(()) => Ok(true),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_many(&self, collection: &str, documents: &[Value]) -> Result<usize, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO collections (name) VALUES (?1)",
            params![collection],
        )?;
        {
            let mut stmt = tx.prepare("INSERT INTO documents (collection, body) VALUES (?1, ?2)")?;
            for document in documents {
                stmt.execute(params![collection, serde_json::to_string(document)?])?;
            }
        }
        tx.commit()?;
        debug!("inserted {} document(s) into '{}'", documents.len(), collection);
        Ok(documents.len())
    }

    fn upload_recorded(&self, file_hash: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        match conn.query_row(
            "SELECT 1 FROM uploaded_files WHERE file_hash = ?1",
            params![file_hash],
            |_| Ok(()),
        ) {
            Ok(()) => Ok(true),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn record_upload(&self, record: &UploadRecord) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO uploaded_files (file_hash) VALUES (?1)",
            params![record.file_hash],
        )?;
        Ok(())
    }

    fn count_documents(&self, collection: &str) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl SqliteStore {
    /// All documents of a container in insertion order.
    #[cfg(test)]
    pub fn documents(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY id")?;
        let bodies = stmt
            .query_map(params![collection], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(StoreError::from))
            .collect()
    }
}
