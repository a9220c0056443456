use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use ulid::Ulid;

use crate::model::{Booking, Collection, NewBooking};
use crate::store::{BookingStore, StoreError};

pub type AppState = Arc<BookingStore>;

pub fn router(store: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/bookings", get(list_active).post(create_booking))
        .route("/api/bookings/{index}", delete(delete_active))
        .route("/api/bookings/id/{id}", delete(delete_active_by_id))
        .route("/api/past", get(list_past).delete(clear_past))
        .route("/api/past/{index}", delete(delete_past))
        .route("/api/past/id/{id}", delete(delete_past_by_id))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Failures a handler can report.
#[derive(Debug)]
pub enum ApiError {
    /// Request body did not parse as a booking.
    MalformedInput(String),
    /// Path segment could not name a booking.
    NotFound,
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

fn error_body(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: error.into() })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MalformedInput(reason) => error_body(StatusCode::BAD_REQUEST, reason),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Store(StoreError::Conflict(_)) => error_body(StatusCode::BAD_REQUEST, "Conflict"),
            ApiError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND.into_response(),
            ApiError::Store(e @ StoreError::Persist(_)) => {
                error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

/// Positional path segments that are not a non-negative integer address nothing.
fn parse_index(raw: &str) -> Result<usize, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

fn parse_id(raw: &str) -> Result<Ulid, ApiError> {
    Ulid::from_string(raw).map_err(|_| ApiError::NotFound)
}

async fn health() -> &'static str {
    "ok"
}

async fn list_active(State(store): State<AppState>) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(store.list_active().await?))
}

async fn list_past(State(store): State<AppState>) -> Json<Vec<Booking>> {
    Json(store.list_past().await)
}

async fn create_booking(
    State(store): State<AppState>,
    body: Result<Json<NewBooking>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let Json(candidate) = body.map_err(|e| ApiError::MalformedInput(e.body_text()))?;
    let booking = store.create(candidate).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn delete_at(store: &BookingStore, collection: Collection, raw: &str) -> Result<StatusCode, ApiError> {
    let index = parse_index(raw)?;
    store.delete(collection, index).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_with_id(store: &BookingStore, collection: Collection, raw: &str) -> Result<StatusCode, ApiError> {
    let id = parse_id(raw)?;
    store.delete_by_id(collection, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_active(
    State(store): State<AppState>,
    Path(index): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_at(&store, Collection::Active, &index).await
}

async fn delete_past(
    State(store): State<AppState>,
    Path(index): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_at(&store, Collection::Archived, &index).await
}

async fn delete_active_by_id(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_with_id(&store, Collection::Active, &id).await
}

async fn delete_past_by_id(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_with_id(&store, Collection::Archived, &id).await
}

async fn clear_past(State(store): State<AppState>) -> Result<StatusCode, ApiError> {
    store.clear_archive().await?;
    Ok(StatusCode::NO_CONTENT)
}
