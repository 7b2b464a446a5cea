//! Cat HTTP Routes
//!
//! CRUD endpoints over the record store, mounted under `/api`:
//!
//! - `POST   /gatos`     create
//! - `GET    /gatos`     list
//! - `GET    /gatos/:id` fetch
//! - `PUT    /gatos/:id` full replace
//! - `DELETE /gatos/:id` delete

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::errors::{ApiError, ApiResult};
use crate::observability::{log_event_with_fields, Event};
use crate::table::{CatFields, CatRecord, RecordStore, TableResult};

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct CatResponse {
    pub message: String,
    pub gato: CatRecord,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================
// Cat Routes
// ==================

/// Create cat routes
pub fn cat_routes(store: Arc<RecordStore>) -> Router {
    Router::new()
        .route("/gatos", get(list_handler).post(create_handler))
        .route(
            "/gatos/:id",
            get(get_handler).put(replace_handler).delete(delete_handler),
        )
        .with_state(store)
}

// ==================
// Helper Functions
// ==================

/// Runs a store operation off the async workers; the store does blocking I/O.
async fn with_store<T, F>(store: Arc<RecordStore>, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&RecordStore) -> TableResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

/// Ids that do not parse are treated as unknown ids.
fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

fn body(payload: Result<Json<CatFields>, JsonRejection>) -> ApiResult<CatFields> {
    payload
        .map(|Json(fields)| fields)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

// ==================
// Handlers
// ==================

async fn create_handler(
    State(store): State<Arc<RecordStore>>,
    payload: Result<Json<CatFields>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CatResponse>)> {
    let fields = body(payload)?;
    let gato = with_store(store, move |s| s.create(fields)).await?;

    let id = gato.id.to_string();
    log_event_with_fields(
        Event::RecordCreated,
        &[("id", &id), ("name", &gato.fields.name)],
    );

    Ok((
        StatusCode::CREATED,
        Json(CatResponse {
            message: "Cat created successfully.".to_string(),
            gato,
        }),
    ))
}

async fn list_handler(State(store): State<Arc<RecordStore>>) -> ApiResult<Json<Vec<CatRecord>>> {
    let gatos = with_store(store, |s| s.list()).await?;
    Ok(Json(gatos))
}

async fn get_handler(
    State(store): State<Arc<RecordStore>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CatRecord>> {
    let id = parse_id(&id)?;
    with_store(store, move |s| s.get_by_id(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn replace_handler(
    State(store): State<Arc<RecordStore>>,
    Path(id): Path<String>,
    payload: Result<Json<CatFields>, JsonRejection>,
) -> ApiResult<Json<CatResponse>> {
    let id = parse_id(&id)?;
    let fields = body(payload)?;

    let gato = with_store(store, move |s| s.replace_by_id(id, fields))
        .await?
        .ok_or(ApiError::NotFound)?;

    log_event_with_fields(Event::RecordReplaced, &[("id", &id.to_string())]);

    Ok(Json(CatResponse {
        message: "Cat updated successfully.".to_string(),
        gato,
    }))
}

async fn delete_handler(
    State(store): State<Arc<RecordStore>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;

    let removed = with_store(store, move |s| s.delete_by_id(id)).await?;
    if removed == 0 {
        return Err(ApiError::NotFound);
    }

    log_event_with_fields(Event::RecordDeleted, &[("id", &id.to_string())]);

    Ok(Json(MessageResponse {
        message: format!("Cat with ID {} deleted successfully.", id),
    }))
}
