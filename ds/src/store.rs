//! SQLite-backed document store

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result, eyre};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::record::Record;

/// Database file name inside the store directory
pub const DB_FILE: &str = "docstore.db";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    collection  TEXT    NOT NULL,
    id          TEXT    NOT NULL,
    data        TEXT    NOT NULL,
    updated_at  INTEGER NOT NULL,
    PRIMARY KEY (collection, id)
);
";

/// Keyed document store
///
/// All operations are single statements, so every write is atomic per key.
/// The store is not `Sync`; share it by moving it into an owning task.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) a store in the given directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        debug!(dir = %dir.display(), "Store::open: called");
        fs::create_dir_all(dir).context(format!("Failed to create store directory {}", dir.display()))?;

        let path = dir.join(DB_FILE);
        let conn = Connection::open(&path).context(format!("Failed to open database {}", path.display()))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA).context("Failed to initialize schema")?;

        info!(path = %path.display(), "Opened document store");
        Ok(Self { conn, path: Some(path) })
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self> {
        debug!("Store::open_in_memory: called");
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA).context("Failed to initialize schema")?;
        Ok(Self { conn, path: None })
    }

    /// Path of the backing database file (None for in-memory stores)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert a new record, failing if the id is already taken
    pub fn create<T: Record>(&mut self, record: T) -> Result<String> {
        let collection = T::collection_name();
        let id = record.id().to_string();
        debug!(%collection, %id, "Store::create: called");

        if self.exists::<T>(&id)? {
            return Err(eyre!("Record {}/{} already exists", collection, id));
        }

        let data = serde_json::to_string(&record)?;
        self.conn.execute(
            "INSERT INTO records (collection, id, data, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![collection, id, data, record.updated_at()],
        )?;
        Ok(id)
    }

    /// Fetch a record by id
    pub fn get<T: Record>(&self, id: &str) -> Result<Option<T>> {
        let collection = T::collection_name();
        debug!(%collection, %id, "Store::get: called");

        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(json) => {
                let record = serde_json::from_str(&json)
                    .context(format!("Failed to deserialize {}/{}", collection, id))?;
                Ok(Some(record))
            }
            None => {
                debug!(%collection, %id, "Store::get: not found");
                Ok(None)
            }
        }
    }

    /// Replace an existing record, failing if it does not exist
    pub fn update<T: Record>(&mut self, record: T) -> Result<()> {
        let collection = T::collection_name();
        debug!(%collection, id = %record.id(), "Store::update: called");

        let data = serde_json::to_string(&record)?;
        let changed = self.conn.execute(
            "UPDATE records SET data = ?3, updated_at = ?4 WHERE collection = ?1 AND id = ?2",
            params![collection, record.id(), data, record.updated_at()],
        )?;

        if changed == 0 {
            return Err(eyre!("Record {}/{} not found", collection, record.id()));
        }
        Ok(())
    }

    /// Insert or replace a record
    pub fn upsert<T: Record>(&mut self, record: T) -> Result<()> {
        let collection = T::collection_name();
        debug!(%collection, id = %record.id(), "Store::upsert: called");

        let data = serde_json::to_string(&record)?;
        self.conn.execute(
            "INSERT INTO records (collection, id, data, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            params![collection, record.id(), data, record.updated_at()],
        )?;
        Ok(())
    }

    /// Delete a record; returns whether anything was removed
    pub fn delete<T: Record>(&mut self, id: &str) -> Result<bool> {
        let collection = T::collection_name();
        debug!(%collection, %id, "Store::delete: called");

        let changed = self.conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(changed > 0)
    }

    /// List every record in the collection
    pub fn list<T: Record>(&self) -> Result<Vec<T>> {
        let collection = T::collection_name();
        debug!(%collection, "Store::list: called");

        let mut stmt = self
            .conn
            .prepare("SELECT data FROM records WHERE collection = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            let json = row?;
            records.push(serde_json::from_str(&json).context(format!("Failed to deserialize {} record", collection))?);
        }
        debug!(%collection, count = records.len(), "Store::list: loaded");
        Ok(records)
    }

    /// Number of records in the collection
    pub fn count<T: Record>(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            params![T::collection_name()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn exists<T: Record>(&self, id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM records WHERE collection = ?1 AND id = ?2",
                params![T::collection_name(), id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::now_ms;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
        updated_at: i64,
    }

    impl Note {
        fn new(id: &str, body: &str) -> Self {
            Self {
                id: id.to_string(),
                body: body.to_string(),
                updated_at: now_ms(),
            }
        }
    }

    impl Record for Note {
        fn id(&self) -> &str {
            &self.id
        }

        fn updated_at(&self) -> i64 {
            self.updated_at
        }

        fn collection_name() -> &'static str {
            "notes"
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Tag {
        id: String,
    }

    impl Record for Tag {
        fn id(&self) -> &str {
            &self.id
        }

        fn updated_at(&self) -> i64 {
            0
        }

        fn collection_name() -> &'static str {
            "tags"
        }
    }

    #[test]
    fn test_create_get_roundtrip() {
        let mut store = Store::open_in_memory().unwrap();
        let id = store.create(Note::new("n1", "hello")).unwrap();
        assert_eq!(id, "n1");

        let loaded: Note = store.get("n1").unwrap().unwrap();
        assert_eq!(loaded.body, "hello");
    }

    #[test]
    fn test_create_duplicate_fails() {
        let mut store = Store::open_in_memory().unwrap();
        store.create(Note::new("n1", "first")).unwrap();
        let result = store.create(Note::new("n1", "second"));
        assert!(result.is_err());

        let loaded: Note = store.get("n1").unwrap().unwrap();
        assert_eq!(loaded.body, "first");
    }

    #[test]
    fn test_update_requires_existing() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(store.update(Note::new("missing", "x")).is_err());

        store.create(Note::new("n1", "old")).unwrap();
        store.update(Note::new("n1", "new")).unwrap();
        let loaded: Note = store.get("n1").unwrap().unwrap();
        assert_eq!(loaded.body, "new");
    }

    #[test]
    fn test_upsert_inserts_then_replaces() {
        let mut store = Store::open_in_memory().unwrap();
        store.upsert(Note::new("n1", "a")).unwrap();
        store.upsert(Note::new("n1", "b")).unwrap();
        assert_eq!(store.count::<Note>().unwrap(), 1);
        let loaded: Note = store.get("n1").unwrap().unwrap();
        assert_eq!(loaded.body, "b");
    }

    #[test]
    fn test_delete_reports_presence() {
        let mut store = Store::open_in_memory().unwrap();
        store.create(Note::new("n1", "x")).unwrap();
        assert!(store.delete::<Note>("n1").unwrap());
        assert!(!store.delete::<Note>("n1").unwrap());
        assert!(store.get::<Note>("n1").unwrap().is_none());
    }

    #[test]
    fn test_collections_are_isolated() {
        let mut store = Store::open_in_memory().unwrap();
        store.create(Note::new("shared", "note")).unwrap();
        store.create(Tag { id: "shared".to_string() }).unwrap();

        assert_eq!(store.list::<Note>().unwrap().len(), 1);
        assert_eq!(store.list::<Tag>().unwrap().len(), 1);
        assert!(store.delete::<Tag>("shared").unwrap());
        assert!(store.get::<Note>("shared").unwrap().is_some());
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp = tempdir().unwrap();
        {
            let mut store = Store::open(temp.path()).unwrap();
            store.create(Note::new("n1", "durable")).unwrap();
            assert!(store.path().unwrap().ends_with(DB_FILE));
        }
        let store = Store::open(temp.path()).unwrap();
        let loaded: Note = store.get("n1").unwrap().unwrap();
        assert_eq!(loaded.body, "durable");
    }
}
