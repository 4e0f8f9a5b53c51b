use crate::cli::ServeArgs;
use crate::demo::{demo_service, seed_demo};
use crate::infra::AppState;
use crate::routes::with_selection_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use portal_selecao::config::AppConfig;
use portal_selecao::error::AppError;
use portal_selecao::telemetry;
use portal_selecao::workflows::selection::SelectionService;
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

    let service = if args.seed_demo {
        let (service, _) = demo_service(config.selection.clone(), Local::now().date_naive());
        let process_id = seed_demo(&service)?;
        info!(process_id = %process_id.0, "demo selection process loaded");
        service
    } else {
        SelectionService::new(
            Arc::default(),
            Arc::default(),
            Arc::default(),
            config.selection.clone(),
        )
    };

    let app = with_selection_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "selection portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
