use crate::cli::ServeArgs;
use crate::infra::{local_verifier, seed_users, AppState};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hirewire::config::AppConfig;
use hirewire::error::AppError;
use hirewire::marketplace::{
    EventBus, IdentityVerifier, InMemoryMarketplaceRepository, MarketplaceService,
};
use hirewire::telemetry;
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let verifier: Arc<dyn IdentityVerifier> = Arc::new(local_verifier());
    let bus = EventBus::new(verifier.clone(), config.events);
    let repository = Arc::new(InMemoryMarketplaceRepository::with_users(seed_users()));
    let marketplace_service = Arc::new(MarketplaceService::new(repository, bus));

    let app = with_marketplace_routes(marketplace_service, verifier)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        session_buffer = config.events.session_buffer,
        "marketplace service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
