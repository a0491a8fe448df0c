use crate::cli::ServeArgs;
use crate::infra::{
    load_reference_store, AppState, InMemoryBuyerRepository, InMemorySavedEstimateRepository,
};
use crate::routes::with_estimator_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use offer_estimator::config::AppConfig;
use offer_estimator::data::ParclLabsClient;
use offer_estimator::error::AppError;
use offer_estimator::telemetry;
use offer_estimator::workflows::buyers::BuyerMatchingService;
use offer_estimator::workflows::comparables::ComparableFinder;
use offer_estimator::workflows::estimate::EstimateService;
use offer_estimator::workflows::saved_estimates::SavedEstimateService;
use offer_estimator::workflows::underwrite::{UnderwriteDefaults, UnderwriteService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let client = Arc::new(ParclLabsClient::new(&config.data_client)?);
    let reference_store = Arc::new(load_reference_store(
        config.reference_data_path.as_deref(),
    )?);
    let underwrite = UnderwriteService::new(reference_store, UnderwriteDefaults::standard());
    let finder = ComparableFinder::new(config.comparables.clone());
    let estimates = Arc::new(EstimateService::new(client, finder, underwrite.clone()));

    let saved_estimates = Arc::new(SavedEstimateService::new(Arc::new(
        InMemorySavedEstimateRepository::default(),
    )));
    let buyer_repository = match args.buyers.take() {
        Some(path) => InMemoryBuyerRepository::from_path(&path)?,
        None => InMemoryBuyerRepository::default(),
    };
    let buyers = Arc::new(BuyerMatchingService::new(Arc::new(buyer_repository)));

    let app = with_estimator_routes(estimates, Arc::new(underwrite), saved_estimates, buyers)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        tiers = ?config.comparables.tiers(),
        "quick offer estimator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
