use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::reference::ReferenceStore;
use super::{SubjectProfile, UnderwriteService};
use crate::workflows::comparables::ComparableProperty;

/// Client-supplied comparables and subject attributes for a recalculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnderwriteRequest {
    #[serde(default)]
    pub comparables: Vec<ComparableProperty>,
    #[serde(default)]
    pub subject: SubjectProfile,
}

pub fn underwrite_router<S>(service: Arc<UnderwriteService<S>>) -> Router
where
    S: ReferenceStore + 'static,
{
    Router::new()
        .route("/api/v1/underwrite/defaults", get(defaults_handler::<S>))
        .route("/api/v1/underwrite/calculate", post(calculate_handler::<S>))
        .with_state(service)
}

pub(crate) async fn defaults_handler<S>(State(service): State<Arc<UnderwriteService<S>>>) -> Response
where
    S: ReferenceStore + 'static,
{
    (StatusCode::OK, Json(service.defaults().scenarios())).into_response()
}

pub(crate) async fn calculate_handler<S>(
    State(service): State<Arc<UnderwriteService<S>>>,
    Json(request): Json<UnderwriteRequest>,
) -> Response
where
    S: ReferenceStore + 'static,
{
    let scenarios = service.underwrite(&request.comparables, &request.subject);
    (StatusCode::OK, Json(scenarios)).into_response()
}
