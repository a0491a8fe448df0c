use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::warn;

use super::domain::EstimateRequest;
use super::service::EstimateService;
use crate::data::PropertyDataClient;
use crate::workflows::underwrite::ReferenceStore;

/// Router builder exposing the quick offer estimate endpoint.
pub fn estimate_router<C, S>(service: Arc<EstimateService<C, S>>) -> Router
where
    C: PropertyDataClient + 'static,
    S: ReferenceStore + 'static,
{
    Router::new()
        .route("/api/v1/estimates", post(estimate_handler::<C, S>))
        .with_state(service)
}

pub(crate) async fn estimate_handler<C, S>(
    State(service): State<Arc<EstimateService<C, S>>>,
    Json(request): Json<EstimateRequest>,
) -> Response
where
    C: PropertyDataClient + 'static,
    S: ReferenceStore + 'static,
{
    match service.estimate(request).await {
        Ok(estimate) => (StatusCode::OK, Json(estimate)).into_response(),
        Err(error) => {
            let status = error.status_code();
            if status.is_server_error() {
                warn!(error = %error, "estimate request failed");
            }
            let payload = json!({
                "error": error.to_string(),
            });
            (status, Json(payload)).into_response()
        }
    }
}
