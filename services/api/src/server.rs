use crate::cli::ServeArgs;
use crate::infra::{load_config, AppState, InMemorySessionStore};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use scoring_dashboard::catalog::Catalog;
use scoring_dashboard::dashboard::DashboardService;
use scoring_dashboard::error::AppError;
use scoring_dashboard::gateway::HttpScoringGateway;
use scoring_dashboard::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = load_config(args.sources.clone())?;

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

    let catalog = Arc::new(Catalog::from_path(
        &config.dashboard.catalog_path,
        &config.dashboard.id_column,
    )?);
    let gateway = Arc::new(HttpScoringGateway::new(config.gateway.base_url.clone()));
    let sessions = Arc::new(InMemorySessionStore::default());
    let dashboard_service = Arc::new(DashboardService::new(
        catalog,
        gateway,
        sessions,
        config.dashboard.session_idle(),
    ));

    let app = with_dashboard_routes(dashboard_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        gateway = %config.gateway.base_url,
        "credit scoring dashboard ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
