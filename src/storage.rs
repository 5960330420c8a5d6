use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::publication::Record;

/// A sink for publication records keyed by their identifier.
pub trait PublicationStore {
    /// Insert `record` under `key`, replacing any record already stored there.
    fn upsert(&mut self, key: &str, record: Record) -> Result<()>;
}

/// Keeps all records in memory, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    records: BTreeMap<String, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Record)> {
        self.records.iter()
    }
}

impl PublicationStore for MemoryStore {
    fn upsert(&mut self, key: &str, record: Record) -> Result<()> {
        self.records.insert(key.to_string(), record);
        Ok(())
    }
}

/// Stores records as json in a SQLite table.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at `path`.
    pub fn open<T: AsRef<Path>>(path: T) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS publications (
                identifier TEXT PRIMARY KEY,
                record     TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> Result<Option<Record>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM publications WHERE identifier = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM publications", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl PublicationStore for SqliteStore {
    fn upsert(&mut self, key: &str, record: Record) -> Result<()> {
        let json = serde_json::to_string(&record)?;
        self.conn.execute(
            "INSERT INTO publications (identifier, record) VALUES (?1, ?2)
             ON CONFLICT(identifier) DO UPDATE SET
                record = excluded.record,
                updated_at = datetime('now')",
            params![key, json],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(title: &str) -> Record {
        match json!({"identifier": "482", "title": title}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn memory_last_write_wins() {
        let mut store = MemoryStore::new();
        store.upsert("482", record("first")).unwrap();
        store.upsert("482", record("second")).unwrap();
        store.upsert("483", record("other")).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("482").unwrap()["title"], "second");
        let keys: Vec<_> = store.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["482", "483"]);
    }

    #[test]
    fn sqlite_last_write_wins() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("482").unwrap(), None);

        store.upsert("482", record("first")).unwrap();
        store.upsert("482", record("second")).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("482").unwrap().unwrap()["title"], "second");
    }

    #[test]
    fn sqlite_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sqlite");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.upsert("482", record("first")).unwrap();
            store.upsert("482", record("second")).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("482").unwrap().unwrap()["title"], "second");
    }
}
