//! Route handlers for the person API.
//!
//! Each handler parses its path and body, runs exactly one store operation on
//! tokio's blocking pool and maps the outcome to a JSON body. Failures are
//! returned as [`ApiError`], which picks the status code.

use axum::async_trait;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use log::debug;

use crate::common::{ItemResponse, ListResponse, MessageResponse};
use crate::model::NewPerson;
use crate::stores::PersonStore;
use crate::ApiError;

/// Request body for create and update.
///
/// The encoding follows the media type of the `Content-Type` header, matched
/// case-insensitively: JSON for `application/json` and `+json` types,
/// multipart for `multipart/form-data`, and a urlencoded form for anything
/// else, including a missing header.
#[derive(Debug)]
pub struct PersonBody(pub NewPerson);

#[derive(Debug, PartialEq, Eq)]
enum BodyFormat {
    Json,
    Multipart,
    Form,
}

fn body_format(headers: &HeaderMap) -> BodyFormat {
    let media_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|mt| mt.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if media_type == "application/json" || media_type.ends_with("+json") {
        BodyFormat::Json
    } else if media_type == "multipart/form-data" {
        BodyFormat::Multipart
    } else {
        BodyFormat::Form
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for PersonBody {
    type Rejection = ApiError;

    async fn from_request(mut req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let person = match body_format(req.headers()) {
            BodyFormat::Json => {
                // axum's own content-type check is case-sensitive.
                req.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                let Json(person) = Json::<NewPerson>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::InvalidBody(e.body_text()))?;
                person
            }
            BodyFormat::Multipart => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::InvalidBody(e.body_text()))?;
                person_from_multipart(multipart).await?
            }
            BodyFormat::Form => {
                req.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                let Form(person) = Form::<NewPerson>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::InvalidBody(e.body_text()))?;
                person
            }
        };
        Ok(PersonBody(person))
    }
}

async fn person_from_multipart(mut multipart: Multipart) -> Result<NewPerson, ApiError> {
    let mut first_name = None;
    let mut last_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidBody(e.body_text()))?
    {
        let slot = match field.name() {
            Some("first_name") => &mut first_name,
            Some("last_name") => &mut last_name,
            _ => continue,
        };
        *slot = Some(
            field
                .text()
                .await
                .map_err(|e| ApiError::InvalidBody(e.body_text()))?,
        );
    }

    match (first_name, last_name) {
        (Some(first_name), Some(last_name)) => Ok(NewPerson::new(first_name, last_name)),
        (None, _) => Err(ApiError::InvalidBody("missing field `first_name`".to_owned())),
        (_, None) => Err(ApiError::InvalidBody("missing field `last_name`".to_owned())),
    }
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId(raw.to_owned()))
}

/// Runs a synchronous store call without blocking the async workers.
async fn run_blocking<E, T, F>(store: E, op: F) -> Result<T, ApiError>
where
    E: PersonStore,
    T: Send + 'static,
    F: FnOnce(E) -> crate::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(store))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

/// `GET /persons`
pub async fn list_persons<E: PersonStore>(
    State(store): State<E>,
) -> Result<Json<ListResponse>, ApiError> {
    let persons = run_blocking(store, |store| store.get_all()).await?;
    debug!("Listing {} persons", persons.len());
    Ok(Json(ListResponse {
        count: persons.len(),
        result: persons,
    }))
}

/// `GET /person/:id`
///
/// An unknown id answers 404 with the zero-count body rather than a bare error.
pub async fn get_person<E: PersonStore>(
    State(store): State<E>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;
    let response = match run_blocking(store, move |store| store.get(id)).await? {
        Some(person) => Json(ItemResponse {
            result: Some(person),
            count: 1,
            error: None,
        })
        .into_response(),
        None => {
            debug!("Person {} not found", id);
            let body = ItemResponse {
                result: None,
                count: 0,
                error: Some(ApiError::NotFound(id).to_string()),
            };
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
    };
    Ok(response)
}

/// `POST /person`
pub async fn create_person<E: PersonStore>(
    State(store): State<E>,
    PersonBody(person): PersonBody,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let name = person.full_name();
    let id = run_blocking(store, move |store| store.add(person)).await?;
    debug!("Created person {} ({})", id, name);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("{} created", name),
            id: Some(id),
        }),
    ))
}

/// `PUT /person/:id`
pub async fn update_person<E: PersonStore>(
    State(store): State<E>,
    Path(raw_id): Path<String>,
    PersonBody(person): PersonBody,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    let name = person.full_name();
    let rows = run_blocking(store, move |store| store.update(id, person)).await?;
    debug!("Updated person {}: {} row(s)", id, rows);
    if rows == 0 {
        return Err(ApiError::NotFound(id));
    }
    Ok(Json(MessageResponse {
        message: format!("updated to {}", name),
        id: None,
    }))
}

/// `DELETE /person/:id`
pub async fn delete_person<E: PersonStore>(
    State(store): State<E>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    let rows = run_blocking(store, move |store| store.delete(id)).await?;
    debug!("Deleted person {}: {} row(s)", id, rows);
    if rows == 0 {
        return Err(ApiError::NotFound(id));
    }
    Ok(Json(MessageResponse {
        message: format!("deleted user: {}", id),
        id: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(parse_id("abc"), Err(ApiError::InvalidId(raw)) if raw == "abc"));
        assert!(matches!(parse_id(""), Err(ApiError::InvalidId(_))));
    }

    fn format_of(content_type: Option<&'static str>) -> BodyFormat {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        body_format(&headers)
    }

    #[test]
    fn body_format_from_content_type() {
        assert_eq!(format_of(Some("application/json")), BodyFormat::Json);
        assert_eq!(format_of(Some("Application/JSON; charset=utf-8")), BodyFormat::Json);
        assert_eq!(format_of(Some("application/merge-patch+json")), BodyFormat::Json);
        assert_eq!(
            format_of(Some("multipart/form-data; boundary=xyz")),
            BodyFormat::Multipart
        );
        assert_eq!(
            format_of(Some("Application/X-WWW-Form-Urlencoded")),
            BodyFormat::Form
        );
        assert_eq!(format_of(Some("text/plain")), BodyFormat::Form);
        assert_eq!(format_of(None), BodyFormat::Form);
    }
}
