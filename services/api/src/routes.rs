use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use offer_estimator::data::PropertyDataClient;
use offer_estimator::workflows::buyers::{buyer_router, BuyerMatchingService, BuyerRepository};
use offer_estimator::workflows::estimate::{estimate_router, EstimateService};
use offer_estimator::workflows::saved_estimates::{
    saved_estimate_router, SavedEstimateRepository, SavedEstimateService,
};
use offer_estimator::workflows::underwrite::{
    underwrite_router, ReferenceStore, UnderwriteService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_estimator_routes<C, S, R, B>(
    estimates: Arc<EstimateService<C, S>>,
    underwrite: Arc<UnderwriteService<S>>,
    saved_estimates: Arc<SavedEstimateService<R>>,
    buyers: Arc<BuyerMatchingService<B>>,
) -> Router
where
    C: PropertyDataClient + 'static,
    S: ReferenceStore + 'static,
    R: SavedEstimateRepository + 'static,
    B: BuyerRepository + 'static,
{
    estimate_router(estimates)
        .merge(underwrite_router(underwrite))
        .merge(saved_estimate_router(saved_estimates))
        .merge(buyer_router(buyers))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryBuyerRepository, InMemorySavedEstimateRepository};
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use offer_estimator::config::{DataClientConfig, DEFAULT_DATA_BASE_URL};
    use offer_estimator::data::ParclLabsClient;
    use offer_estimator::workflows::buyers::BuyerProfile;
    use offer_estimator::workflows::comparables::ComparableFinder;
    use offer_estimator::workflows::underwrite::{StaticReferenceStore, UnderwriteDefaults};
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> Router {
        let client = ParclLabsClient::new(&DataClientConfig {
            base_url: DEFAULT_DATA_BASE_URL.to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
            page_size: 100,
            max_pages: 1,
        })
        .expect("client builds");
        let underwrite = UnderwriteService::new(
            Arc::new(StaticReferenceStore::default()),
            UnderwriteDefaults::standard(),
        );
        let estimates = EstimateService::new(
            Arc::new(client),
            ComparableFinder::default(),
            underwrite.clone(),
        );
        let buyers = InMemoryBuyerRepository::with_buyers(vec![BuyerProfile {
            id: 3,
            company_name: "Prairie Homes".to_string(),
            investor_profile: json!({"markets": ["Des Moines"]}),
            purchases_last_12_months: 14,
            active: true,
        }]);

        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };

        with_estimator_routes(
            Arc::new(estimates),
            Arc::new(underwrite),
            Arc::new(SavedEstimateService::new(Arc::new(
                InMemorySavedEstimateRepository::default(),
            ))),
            Arc::new(BuyerMatchingService::new(Arc::new(buyers))),
        )
        .layer(Extension(state))
    }

    async fn get_path(router: Router, path: &str) -> Response {
        router
            .oneshot(
                Request::get(path)
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes")
    }

    async fn read_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = get_path(app(false), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let response = get_path(app(false), "/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(read_json(response).await["status"], "initializing");

        let response = get_path(app(true), "/ready").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn metrics_use_prometheus_text_format() {
        let response = get_path(app(true), "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn merged_routers_share_one_app() {
        let response = get_path(app(true), "/api/v1/underwrite/defaults").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["flip"]["margin"], 25.0);

        let response = get_path(app(true), "/api/v1/buyers/active").await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["count"], 1);
        assert_eq!(payload["buyers"][0]["company_name"], "Prairie Homes");
    }

    #[tokio::test]
    async fn saved_estimates_persist_across_requests() {
        let router = app(true);
        let body = json!({
            "user_id": 42,
            "property_address": "4107 Beaver Ave, Des Moines, IA 50310",
            "estimate_data": {"offer_range_low": 180000, "offer_range_high": 205000}
        });
        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/saved-estimates")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = get_path(router, "/api/v1/saved-estimates/user/42").await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["count"], 1);
        assert_eq!(
            payload["estimates"][0]["estimate_data"]["offer_range_high"],
            205000
        );
    }
}
