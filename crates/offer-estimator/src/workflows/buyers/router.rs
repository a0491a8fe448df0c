use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::{BuyerError, BuyerMatchingService, BuyerRepository};

pub fn buyer_router<R>(service: Arc<BuyerMatchingService<R>>) -> Router
where
    R: BuyerRepository + 'static,
{
    Router::new()
        .route("/api/v1/buyers/active", get(active_handler::<R>))
        .route("/api/v1/buyers/:buyer_id", get(buyer_handler::<R>))
        .with_state(service)
}

fn error_response(error: BuyerError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error.status_code(), Json(payload)).into_response()
}

pub(crate) async fn active_handler<R>(State(service): State<Arc<BuyerMatchingService<R>>>) -> Response
where
    R: BuyerRepository + 'static,
{
    match service.active_buyers() {
        Ok(buyers) => {
            let payload = json!({
                "count": buyers.len(),
                "buyers": buyers,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn buyer_handler<R>(
    State(service): State<Arc<BuyerMatchingService<R>>>,
    Path(buyer_id): Path<u64>,
) -> Response
where
    R: BuyerRepository + 'static,
{
    match service.get(buyer_id) {
        Ok(buyer) => (StatusCode::OK, Json(buyer)).into_response(),
        Err(error) => error_response(error),
    }
}
