use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState, RosterSource};
use crate::routes::with_workload_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use newsroom_workload::config::AppConfig;
use newsroom_workload::error::AppError;
use newsroom_workload::telemetry;
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

    let source = if args.empty {
        RosterSource::Empty
    } else {
        RosterSource::Sample
    };
    let (service, seeded) = build_service(config.engine, source, true)?;

    let app = with_workload_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        rounding = ?config.engine.rounding,
        units = seeded.units,
        employees = seeded.employees,
        "newsroom workload service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
