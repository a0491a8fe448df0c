use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{NewSavedEstimate, SavedEstimate, SavedEstimateId, SavedEstimateUpdate};
use super::repository::SavedEstimateRepository;
use super::service::{SavedEstimateError, SavedEstimateService};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default, alias = "searchTerm")]
    pub(crate) search_term: Option<String>,
}

pub fn saved_estimate_router<R>(service: Arc<SavedEstimateService<R>>) -> Router
where
    R: SavedEstimateRepository + 'static,
{
    Router::new()
        .route("/api/v1/saved-estimates", post(save_handler::<R>))
        .route(
            "/api/v1/saved-estimates/user/:user_id",
            get(list_handler::<R>),
        )
        .route(
            "/api/v1/saved-estimates/search/:user_id",
            get(search_handler::<R>),
        )
        .route(
            "/api/v1/saved-estimates/:estimate_id",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .with_state(service)
}

fn error_response(error: SavedEstimateError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error.status_code(), Json(payload)).into_response()
}

fn listing_response(estimates: Vec<SavedEstimate>) -> Response {
    let payload = json!({
        "count": estimates.len(),
        "estimates": estimates,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn save_handler<R>(
    State(service): State<Arc<SavedEstimateService<R>>>,
    Json(draft): Json<NewSavedEstimate>,
) -> Response
where
    R: SavedEstimateRepository + 'static,
{
    match service.save(draft) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<SavedEstimateService<R>>>,
    Path(user_id): Path<u64>,
) -> Response
where
    R: SavedEstimateRepository + 'static,
{
    match service.list_for_user(user_id) {
        Ok(estimates) => listing_response(estimates),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn search_handler<R>(
    State(service): State<Arc<SavedEstimateService<R>>>,
    Path(user_id): Path<u64>,
    Query(params): Query<SearchParams>,
) -> Response
where
    R: SavedEstimateRepository + 'static,
{
    match service.search(user_id, params.search_term.as_deref()) {
        Ok(estimates) => listing_response(estimates),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<SavedEstimateService<R>>>,
    Path(estimate_id): Path<u64>,
) -> Response
where
    R: SavedEstimateRepository + 'static,
{
    match service.get(SavedEstimateId(estimate_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<SavedEstimateService<R>>>,
    Path(estimate_id): Path<u64>,
    Json(update): Json<SavedEstimateUpdate>,
) -> Response
where
    R: SavedEstimateRepository + 'static,
{
    match service.update(SavedEstimateId(estimate_id), update) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<SavedEstimateService<R>>>,
    Path(estimate_id): Path<u64>,
) -> Response
where
    R: SavedEstimateRepository + 'static,
{
    match service.delete(SavedEstimateId(estimate_id)) {
        Ok(()) => {
            let payload = json!({
                "deleted": true,
                "id": estimate_id,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}
