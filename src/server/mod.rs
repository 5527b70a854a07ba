pub mod handlers;
pub mod types;

use crate::{config::Config, pipeline::PredictionService, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn router(service: Arc<PredictionService>) -> Router {
    let app_state = handlers::AppState { service };

    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/predict/", post(handlers::predict))
        .route("/tasks", get(handlers::list_tasks))
        .route("/tasks/:task_id", get(handlers::get_task))
        .route("/reference/reload", post(handlers::reload_reference))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn run(config: Config) -> Result<()> {
    // Model, schema and ledger must all be available before serving.
    let service = PredictionService::from_config(&config).await?;

    let app = router(Arc::new(service));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
