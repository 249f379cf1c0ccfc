use crate::cli::ServeArgs;
use crate::infra::{
    load_applications, AppState, InMemoryApplicationStore, InMemoryCourseCatalog,
    InMemoryNoticePublisher, InMemoryUserDirectory,
};
use crate::routes::with_selection_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use teachteam::config::AppConfig;
use teachteam::error::AppError;
use teachteam::selection::SelectionService;
use teachteam::session::SessionRegistry;
use teachteam::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(seed) = args.seed_csv.take() {
        config.seed.applications_csv = Some(seed);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let applications = load_applications(config.seed.applications_csv.as_deref())?;
    info!(count = applications.len(), "seeded application store");

    let service = Arc::new(SelectionService::new(
        Arc::new(InMemoryApplicationStore::with_records(applications)),
        Arc::new(InMemoryNoticePublisher::default()),
        Arc::new(InMemoryCourseCatalog::standard()),
        Arc::new(InMemoryUserDirectory::standard()),
    ));
    let sessions = Arc::new(SessionRegistry::default());

    let app = with_selection_routes(service, sessions)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "teachteam selection service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
