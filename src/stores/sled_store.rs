use std::path::Path;

use log::warn;
use sled::{Db, Tree};

use super::PersonStore;
use crate::model::{NewPerson, Person};
use crate::{PersonError, Result};

const PERSONS_TREE: &str = "persons";
const META_TREE: &str = "meta";
const NEXT_ID_KEY: &str = "next_id";

/// A person store backed by the `sled` embedded database.
///
/// Records live in the `persons` tree, keyed by the decimal string form of
/// their id, with the full record as JSON bytes for the value. The id counter
/// lives in the `meta` tree and is advanced atomically, so concurrent creates
/// never share an id and numbering survives a reopen.
///
/// `sled::Db` and `sled::Tree` are internally `Arc`-based, so cloning is cheap.
#[derive(Clone)]
pub struct SledPersonStore {
    db: Db,
    persons: Tree,
    meta: Tree,
}

impl SledPersonStore {
    /// Creates a `SledPersonStore` from an already-opened sled `Db`.
    pub fn new(db: Db) -> Result<Self> {
        let persons = db.open_tree(PERSONS_TREE)?;
        let meta = db.open_tree(META_TREE)?;
        Ok(Self { db, persons, meta })
    }

    /// Opens (or creates) the sled database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(sled::open(path)?)
    }

    /// Removes every record and resets the id counter.
    pub fn clear(&self) -> Result<()> {
        self.persons.clear()?;
        self.meta.clear()?;
        self.db.flush()?;
        Ok(())
    }

    fn next_id(&self) -> Result<i64> {
        let next = self.meta.update_and_fetch(NEXT_ID_KEY, |old| {
            let current = old.and_then(decode_counter).unwrap_or(0);
            Some((current + 1).to_be_bytes().to_vec())
        })?;
        next.as_deref()
            .and_then(decode_counter)
            .ok_or_else(|| PersonError::StringError("id counter missing after update".to_owned()))
    }
}

fn decode_counter(bytes: &[u8]) -> Option<i64> {
    <[u8; 8]>::try_from(bytes).ok().map(i64::from_be_bytes)
}

fn key(id: i64) -> String {
    id.to_string()
}

impl PersonStore for SledPersonStore {
    fn get(&self, id: i64) -> Result<Option<Person>> {
        self.persons
            .get(key(id))?
            .map(|ivec| Person::from_bytes(&ivec))
            .transpose()
    }

    fn get_all(&self) -> Result<Vec<Person>> {
        let mut persons = Vec::new();
        for entry in self.persons.iter() {
            let (raw_key, value) = entry?;
            match Person::from_bytes(&value) {
                Ok(person) => persons.push(person),
                Err(e) => warn!(
                    "Skipping undecodable record at key {}: {}",
                    String::from_utf8_lossy(&raw_key),
                    e
                ),
            }
        }
        Ok(persons)
    }

    fn add(&self, person: NewPerson) -> Result<i64> {
        let id = self.next_id()?;
        let value = person.with_id(id).to_bytes()?;
        self.persons.insert(key(id), value)?;
        self.db.flush()?;
        Ok(id)
    }

    fn update(&self, id: i64, person: NewPerson) -> Result<usize> {
        let value = person.with_id(id).to_bytes()?;
        let previous = self
            .persons
            .fetch_and_update(key(id), |old| old.map(|_| value.clone()))?;
        if previous.is_none() {
            return Ok(0);
        }
        self.db.flush()?;
        Ok(1)
    }

    fn delete(&self, id: i64) -> Result<usize> {
        if self.persons.remove(key(id))?.is_none() {
            return Ok(0);
        }
        self.db.flush()?;
        Ok(1)
    }
}
