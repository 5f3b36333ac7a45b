//! Analysis workflow API handlers
//!
//! POST /analysis/start, GET /analysis/progress/:job_id,
//! GET /analysis/events/:job_id (SSE), GET /analysis/result/:analysis_id

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::MatchAnalysis,
    services::JobProgress,
    AppState,
};

/// Server-side cadence for the per-job SSE stream
const SSE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// POST /analysis/start request
#[derive(Debug, Deserialize)]
pub struct StartAnalysisRequest {
    pub video_path: String,
    /// Optional caller-supplied job identifier; generated when absent
    #[serde(default)]
    pub job_id: Option<String>,
}

/// POST /analysis/start response
#[derive(Debug, Serialize)]
pub struct StartAnalysisResponse {
    pub job_id: String,
    pub stage: String,
    pub progress: u8,
}

/// Progress snapshot returned by the poll endpoint and the SSE stream
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub stage: String,
    pub progress: u8,
    #[serde(rename = "analysisId", skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<JobProgress> for ProgressResponse {
    fn from(entry: JobProgress) -> Self {
        Self {
            stage: entry.stage,
            progress: entry.progress,
            analysis_id: entry.analysis_id,
            error: entry.error,
        }
    }
}

/// POST /analysis/start
///
/// Begin a match analysis. Returns 202 Accepted with the job id; the
/// pipeline runs as a background task and reports through the progress
/// endpoints.
pub async fn start_analysis(
    State(state): State<AppState>,
    Json(request): Json<StartAnalysisRequest>,
) -> ApiResult<(StatusCode, Json<StartAnalysisResponse>)> {
    let path = PathBuf::from(&request.video_path);
    if !path.is_file() {
        return Err(ApiError::BadRequest(format!(
            "Video file does not exist: {}",
            request.video_path
        )));
    }

    let job_id = request
        .job_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // Atomic claim: registered before spawning so an immediate poll
    // never sees 404, and concurrent starts cannot share an id
    if !state.progress.try_insert(&job_id, "queued") {
        return Err(ApiError::Conflict(format!(
            "Job identifier already in use: {}",
            job_id
        )));
    }

    tracing::info!(job_id = %job_id, video = %request.video_path, "Analysis job accepted");

    let orchestrator = state.orchestrator.clone();
    let spawned_job_id = job_id.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.analyze(&spawned_job_id, &path).await {
            tracing::error!(
                job_id = %spawned_job_id,
                error = %e,
                "Background analysis task failed"
            );
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(StartAnalysisResponse {
            job_id,
            stage: "queued".to_string(),
            progress: 0,
        }),
    ))
}

/// GET /analysis/progress/:job_id
///
/// Poll the latest progress tuple. The registry entry is removed once a
/// terminal value has been handed out; later polls get 404.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let entry = state
        .progress
        .get(&job_id)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown job: {}", job_id)))?;

    if entry.is_terminal() {
        state.progress.remove(&job_id);
    }

    Ok(Json(entry.into()))
}

/// GET /analysis/events/:job_id - SSE progress stream
///
/// Emits a `progress` event whenever the stored percentage changes,
/// at a fixed server-side polling cadence. The stream ends after the
/// terminal event, removing the registry entry; an unknown job yields a
/// single `error` event.
pub async fn progress_stream(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!(job_id = %job_id, "New SSE client subscribed to job progress");

    let stream = async_stream::stream! {
        if state.progress.get(&job_id).is_none() {
            yield Ok(Event::default().event("error").data("unknown job"));
            return;
        }

        let mut last_seen: Option<u8> = None;
        loop {
            let Some(entry) = state.progress.get(&job_id) else {
                // Entry observed elsewhere and removed; nothing more to say
                break;
            };

            let terminal = entry.is_terminal();
            let changed = last_seen != Some(entry.progress);
            if changed || terminal {
                last_seen = Some(entry.progress);
                let payload = ProgressResponse::from(entry);
                match serde_json::to_string(&payload) {
                    Ok(json) => yield Ok(Event::default().event("progress").data(json)),
                    Err(e) => tracing::warn!(error = %e, "Failed to serialize progress event"),
                }
            }

            if terminal {
                state.progress.remove(&job_id);
                break;
            }
            tokio::time::sleep(SSE_POLL_INTERVAL).await;
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}

/// GET /analysis/result/:analysis_id
pub async fn get_result(
    State(state): State<AppState>,
    Path(analysis_id): Path<i64>,
) -> ApiResult<Json<MatchAnalysis>> {
    let analysis = state
        .results
        .get(analysis_id)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown analysis: {}", analysis_id)))?;
    Ok(Json(analysis))
}

/// Build analysis workflow routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/analysis/start", post(start_analysis))
        .route("/analysis/progress/:job_id", get(get_progress))
        .route("/analysis/events/:job_id", get(progress_stream))
        .route("/analysis/result/:analysis_id", get(get_result))
}
