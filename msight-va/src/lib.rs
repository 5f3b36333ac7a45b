//! msight-va library interface
//!
//! Exposes the analysis pipeline and HTTP surface for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult, PipelineError};

use crate::config::VaConfig;
use crate::services::{AnalysisOrchestrator, MediaService, ProgressRegistry, ResultStore};
use axum::Router;
use chrono::{DateTime, Utc};
use msight_common::events::EventBus;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Job-keyed progress registry written by the pipeline
    pub progress: ProgressRegistry,
    /// Completed analyses keyed by analysis id
    pub results: ResultStore,
    /// The pipeline itself; one instance serves all jobs
    pub orchestrator: Arc<AnalysisOrchestrator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(media: Arc<dyn MediaService>, config: &VaConfig, event_bus: EventBus) -> Self {
        let progress = ProgressRegistry::new();
        let results = ResultStore::new();
        let orchestrator = Arc::new(AnalysisOrchestrator::new(
            media,
            progress.clone(),
            results.clone(),
            event_bus.clone(),
            config.sport.clone(),
            config.poll_interval,
            config.processing_timeout,
        ));
        Self {
            event_bus,
            progress,
            results,
            orchestrator,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::analysis_routes())
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .with_state(state)
}
