mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::core::intake::AutoAnalysisService;
use crate::core::pipeline::PipelineContext;
use crate::core::store::AnalysisStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AnalysisStore>,
    pub pipeline: Arc<PipelineContext>,
    pub intake: Arc<AutoAnalysisService>,
    pub config: Arc<AppConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/analyses",
            post(handlers::analyses::create_analysis).get(handlers::analyses::list_analyses),
        )
        .route("/api/analyses/{job_id}", get(handlers::analyses::get_analysis))
        .route(
            "/api/analyses/{job_id}/social",
            get(handlers::analyses::list_social_posts),
        )
        .route(
            "/api/webhooks/{provider}",
            post(handlers::webhooks::webhook_endpoint),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.api_host, state.config.api_port);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API Server running at http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
