// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{path::Path, sync::Arc};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::fountain_service::FountainService;
use crate::application::observation_repository::ObservationRepository;
use crate::application::observation_service::ObservationService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::memory_repository::MemoryRepository;
use crate::infrastructure::postgres_repository::PostgresRepository;
use crate::infrastructure::seed::seed_if_empty;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    bulk_edit_observations, create_fountain, delete_fountain, get_dashboard, health_check,
    interpret_scan, list_fountains, list_observations, record_observation,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create repository (infrastructure layer), once for the whole process
    let repository: Arc<dyn ObservationRepository> = match &config.store.database_url {
        Some(database_url) => Arc::new(
            PostgresRepository::connect(database_url, config.store.max_connections).await?,
        ),
        None => {
            tracing::warn!("No database_url configured, readings are kept in memory only");
            Arc::new(MemoryRepository::new())
        }
    };

    if let Some(seed_path) = &config.store.seed_path {
        seed_if_empty(
            repository.as_ref(),
            Path::new(seed_path),
            &config.store.seed_fountain,
            config.projection.default_target,
        )
        .await?;
    }

    // Create services (application layer)
    let password = config.security.delete_password.clone();
    let state = Arc::new(AppState {
        dashboard_service: DashboardService::new(
            repository.clone(),
            config.projection.default_target,
        ),
        fountain_service: FountainService::new(repository.clone(), password.clone()),
        observation_service: ObservationService::new(repository, password),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/fountains", get(list_fountains).post(create_fountain))
        .route("/fountains/:id/delete", post(delete_fountain))
        .route("/observations", get(list_observations).post(record_observation))
        .route("/observations/bulk", post(bulk_edit_observations))
        .route("/scan", post(interpret_scan))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.server.socket_addr()?;
    tracing::info!("Starting fountain-tracker service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
