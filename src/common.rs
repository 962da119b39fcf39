use serde::Serialize;

use crate::model::Person;

/// Body returned by `GET /persons`.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// All stored persons, in store-defined order.
    pub result: Vec<Person>,
    /// Number of entries in `result`.
    pub count: usize,
}

/// Body returned by `GET /person/:id`.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    /// The person, or `null` when the id is unknown.
    pub result: Option<Person>,
    /// 1 when found, 0 otherwise.
    pub count: usize,
    /// Set when the id is unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body returned by the create, update and delete routes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Id assigned by a create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Description of what went wrong.
    pub error: String,
}
