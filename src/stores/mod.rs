use crate::model::{NewPerson, Person};
use crate::Result;

/// Trait for a person storage backend.
///
/// Implementors provide the five CRUD operations behind the HTTP API.
/// A missing record is never an error: `get` returns `None` and
/// `update`/`delete` report zero affected rows.
///
/// Stores must be cloneable (cheaply, via `Arc` or an internally shared
/// handle) and safe to send across threads, so each request handler can
/// own a clone.
pub trait PersonStore: Clone + Send + Sync + 'static {
    /// Fetches the person with the given id.
    fn get(&self, id: i64) -> Result<Option<Person>>;

    /// Fetches every stored person, in store-defined order.
    fn get_all(&self) -> Result<Vec<Person>>;

    /// Stores a new person and returns the id the store assigned to it.
    fn add(&self, person: NewPerson) -> Result<i64>;

    /// Replaces the names of an existing person.
    ///
    /// Returns the number of affected records: 1 if updated, 0 if the id
    /// does not exist.
    fn update(&self, id: i64, person: NewPerson) -> Result<usize>;

    /// Removes a person.
    ///
    /// Returns the number of affected records: 1 if removed, 0 if the id
    /// does not exist.
    fn delete(&self, id: i64) -> Result<usize>;
}

mod sled_store;
mod sqlite;

pub use self::sled_store::SledPersonStore;
pub use self::sqlite::SqlitePersonStore;
