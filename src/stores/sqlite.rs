use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::PersonStore;
use crate::model::{NewPerson, Person};
use crate::{PersonError, Result};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS person (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL
)";
const SELECT_ONE: &str = "SELECT id, first_name, last_name FROM person WHERE id = ?1";
const SELECT_ALL: &str = "SELECT id, first_name, last_name FROM person";
const INSERT: &str = "INSERT INTO person (first_name, last_name) VALUES (?1, ?2)";
const UPDATE: &str = "UPDATE person SET first_name = ?1, last_name = ?2 WHERE id = ?3";
const DELETE: &str = "DELETE FROM person WHERE id = ?1";

/// A person store backed by a SQLite `person` table.
///
/// All statements are prepared through the connection's statement cache.
/// The single connection is shared by every clone behind a `Mutex`, so
/// requests touching the store are serialized.
#[derive(Clone)]
pub struct SqlitePersonStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePersonStore {
    /// Creates a `SqlitePersonStore` from an already-opened connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens (or creates) the database file at `path`.
    ///
    /// The `person` table is expected to exist already; call
    /// [`check_schema`](Self::check_schema) to verify it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// Opens a private in-memory database. The table still has to be created.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// Creates the `person` table if it does not exist yet.
    pub fn create_table(&self) -> Result<()> {
        self.lock()?.execute_batch(CREATE_TABLE)?;
        Ok(())
    }

    /// Fails if the `person` table is missing or lacks the expected columns.
    pub fn check_schema(&self) -> Result<()> {
        self.lock()?.prepare_cached(SELECT_ALL)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PersonError::StringError("SQLite connection lock poisoned".to_owned()))
    }
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
    })
}

impl PersonStore for SqlitePersonStore {
    fn get(&self, id: i64) -> Result<Option<Person>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(SELECT_ONE)?;
        Ok(stmt.query_row(params![id], person_from_row).optional()?)
    }

    fn get_all(&self) -> Result<Vec<Person>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(SELECT_ALL)?;
        let persons = stmt
            .query_map([], person_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(persons)
    }

    fn add(&self, person: NewPerson) -> Result<i64> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(INSERT)?;
        stmt.execute(params![person.first_name, person.last_name])?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, id: i64, person: NewPerson) -> Result<usize> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(UPDATE)?;
        Ok(stmt.execute(params![person.first_name, person.last_name, id])?)
    }

    fn delete(&self, id: i64) -> Result<usize> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(DELETE)?;
        Ok(stmt.execute(params![id])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_table_is_a_store_error() {
        let store = SqlitePersonStore::open_in_memory().unwrap();
        let err = store.check_schema().unwrap_err();
        assert!(matches!(err, PersonError::Sqlite(_)));
        assert!(err.to_string().contains("no such table"));

        assert!(matches!(store.get(1), Err(PersonError::Sqlite(_))));
    }

    #[test]
    fn create_table_is_idempotent() {
        let store = SqlitePersonStore::open_in_memory().unwrap();
        store.create_table().unwrap();
        store.create_table().unwrap();
        store.check_schema().unwrap();
    }

    #[test]
    fn deleted_max_id_is_not_reused() {
        let store = SqlitePersonStore::open_in_memory().unwrap();
        store.create_table().unwrap();
        let first = store.add(NewPerson::new("Ada", "Lovelace")).unwrap();
        assert_eq!(store.delete(first).unwrap(), 1);
        let second = store.add(NewPerson::new("Grace", "Hopper")).unwrap();
        assert!(second > first);
    }
}
