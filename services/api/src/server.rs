use crate::cli::ServeArgs;
use crate::demo;
use crate::infra::{
    ApiContext, AppState, InMemoryOkrRepository, RepositoryLevelSource, RepositoryPersister,
};
use crate::routes::okr_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use okr_tracker::config::AppConfig;
use okr_tracker::error::AppError;
use okr_tracker::okr::autosave::AutosaveQueue;
use okr_tracker::okr::OkrService;
use okr_tracker::scoring::store::ScoreLevelStore;
use okr_tracker::telemetry;
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

    let repository = Arc::new(InMemoryOkrRepository::default());
    let source = Arc::new(RepositoryLevelSource::new(repository.clone()));
    let level_store = Arc::new(ScoreLevelStore::new(source));
    let service = Arc::new(OkrService::new(repository.clone(), level_store));
    demo::seed(&service)?;

    let persister = Arc::new(RepositoryPersister::new(repository));
    let autosave = AutosaveQueue::new(persister, config.autosave.debounce());
    let context = ApiContext { service, autosave };

    let app = okr_router(context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "okr score tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
