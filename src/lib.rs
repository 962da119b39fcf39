#![deny(missing_docs)]

//! A small CRUD REST API for person records.
//!
//! This library serves list/get/create/update/delete over HTTP for a
//! single `Person` entity, with pluggable storage: a SQLite table
//! accessed through prepared statements, or the `sled` embedded
//! key-value store.

mod common;
mod error;
pub mod handlers;
mod model;
mod server;
mod stores;

pub use common::{ErrorResponse, ItemResponse, ListResponse, MessageResponse};
pub use error::{ApiError, PersonError, Result};
pub use model::{NewPerson, Person};
pub use server::PersonServer;
pub use stores::{PersonStore, SledPersonStore, SqlitePersonStore};
