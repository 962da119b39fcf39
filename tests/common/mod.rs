#![allow(dead_code)]

use persons::{SledPersonStore, SqlitePersonStore};

/// An in-memory SQLite store with the `person` table in place.
pub fn sqlite_store() -> SqlitePersonStore {
    let store = SqlitePersonStore::open_in_memory().unwrap();
    store.create_table().unwrap();
    store
}

/// A sled store that is deleted when dropped.
pub fn sled_store() -> SledPersonStore {
    let db = sled::Config::new().temporary(true).open().unwrap();
    SledPersonStore::new(db).unwrap()
}
