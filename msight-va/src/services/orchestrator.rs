//! Match analysis orchestrator
//!
//! Drives one analysis run end to end:
//! upload + ready-wait (asset manager) → narrative task → canonical name
//! derivation → five concurrent extraction tasks → name reconciliation →
//! aggregate assembly. Only asset-lifecycle failures abort a run; every
//! extraction failure degrades to fallback data plus an error-map entry,
//! so the join over the five tasks settles all of them by construction.
//!
//! Cancellation is not supported: once an extraction call is in flight
//! there is no way to abort it early. A caller that stops watching the
//! progress channel leaves the run to finish on its own.

use crate::error::PipelineError;
use crate::models::{AdviceBatch, MatchAnalysis, PlayerBatch, TaskErrors};
use crate::services::asset_manager::AssetManager;
use crate::services::media_client::{AssetState, MediaService, RemoteAsset};
use crate::services::name_reconciler;
use crate::services::progress::ProgressRegistry;
use crate::services::prompts::{TaskKind, NARRATIVE_PROMPT};
use crate::services::recovery_parser;
use crate::services::results::ResultStore;
use chrono::Utc;
use msight_common::events::{AnalysisEvent, EventBus};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Typed payload of one settled extraction task
pub enum TaskData {
    Series(PlayerBatch),
    Advice(AdviceBatch),
}

/// One settled extraction task: data is always present (fallback on
/// failure), the error string says why a fallback was substituted
pub struct TaskOutcome {
    pub kind: TaskKind,
    pub data: TaskData,
    pub error: Option<String>,
}

/// Everything gathered while the remote asset was alive
struct ExtractionBundle {
    narrative: Option<String>,
    narrative_error: Option<String>,
    pair: [String; 2],
    outcomes: Vec<TaskOutcome>,
}

/// Orchestrates the full match-video analysis pipeline
pub struct AnalysisOrchestrator {
    media: Arc<dyn MediaService>,
    assets: AssetManager,
    progress: ProgressRegistry,
    results: ResultStore,
    event_bus: EventBus,
    sport: String,
}

impl AnalysisOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        media: Arc<dyn MediaService>,
        progress: ProgressRegistry,
        results: ResultStore,
        event_bus: EventBus,
        sport: String,
        poll_interval: Duration,
        processing_timeout: Duration,
    ) -> Self {
        let assets = AssetManager::new(media.clone(), poll_interval, processing_timeout);
        Self {
            media,
            assets,
            progress,
            results,
            event_bus,
            sport,
        }
    }

    /// Run one complete analysis
    ///
    /// On success the aggregate has been stored and the terminal
    /// progress entry (100% + analysis id) written, in that order. On a
    /// fatal failure the progress entry carries the failure marker and
    /// the error propagates; the remote asset is released either way.
    pub async fn analyze(
        &self,
        job_id: &str,
        video_path: &Path,
    ) -> Result<MatchAnalysis, PipelineError> {
        let started = Instant::now();

        tracing::info!(job_id, video = %video_path.display(), "Starting match analysis");
        self.event_bus.emit_lossy(AnalysisEvent::AnalysisStarted {
            job_id: job_id.to_string(),
            video_path: video_path.display().to_string(),
            timestamp: Utc::now(),
        });

        let outcome = self
            .assets
            .with_ready_asset(
                video_path,
                "video/mp4",
                |state| match state {
                    AssetState::Uploading => self.report(job_id, "uploading video", 10),
                    AssetState::Processing => self.report(job_id, "processing video", 20),
                    AssetState::Ready | AssetState::Failed => {}
                },
                |asset| self.run_extractions(job_id, asset),
            )
            .await;

        let bundle = match outcome {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::error!(job_id, error = %e, "Analysis pipeline failed");
                self.progress.fail(job_id, &e.to_string());
                self.event_bus.emit_lossy(AnalysisEvent::AnalysisFailed {
                    job_id: job_id.to_string(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(e);
            }
        };

        self.report(job_id, "finalizing analysis", 95);

        let analysis = self.assemble(bundle, started);
        let analysis_id = self.results.insert(analysis.clone());
        // Terminal write strictly after the result became retrievable
        self.progress.complete(job_id, analysis_id);

        let duration_ms = started.elapsed().as_millis() as u64;
        self.event_bus.emit_lossy(AnalysisEvent::AnalysisCompleted {
            job_id: job_id.to_string(),
            analysis_id,
            duration_ms,
            timestamp: Utc::now(),
        });
        tracing::info!(job_id, analysis_id, duration_ms, "Match analysis completed");

        Ok(analysis)
    }

    /// Narrative first, then the five extraction tasks concurrently
    async fn run_extractions(
        &self,
        job_id: &str,
        asset: RemoteAsset,
    ) -> Result<ExtractionBundle, PipelineError> {
        self.report(job_id, "analyzing match narrative", 30);

        let (narrative, narrative_error) = match self.media.generate(&asset, NARRATIVE_PROMPT).await
        {
            Ok(text) => (Some(text), None),
            Err(e) => {
                tracing::warn!(
                    job_id,
                    error = %e,
                    "Narrative task failed; continuing with placeholder names"
                );
                (None, Some(format!("narrative generation failed: {}", e)))
            }
        };

        let candidates = narrative
            .as_deref()
            .map(name_reconciler::extract_candidate_names)
            .unwrap_or_default();
        let pair = name_reconciler::canonical_pair(&candidates);
        tracing::debug!(job_id, player1 = %pair[0], player2 = %pair[1], "Canonical athlete names");

        self.report(job_id, "running comprehensive analysis", 40);

        let tasks = TaskKind::ALL
            .iter()
            .map(|&kind| self.run_task(kind, &asset, &pair));
        let outcomes = futures::future::join_all(tasks).await;

        Ok(ExtractionBundle {
            narrative,
            narrative_error,
            pair,
            outcomes,
        })
    }

    /// One extraction task; never propagates a failure
    async fn run_task(
        &self,
        kind: TaskKind,
        asset: &RemoteAsset,
        pair: &[String; 2],
    ) -> TaskOutcome {
        match self.execute_task(kind, asset, pair).await {
            Ok(data) => TaskOutcome {
                kind,
                data,
                error: None,
            },
            Err(message) => {
                tracing::warn!(
                    task = kind.name(),
                    error = %message,
                    "Extraction task failed, substituting fallback"
                );
                let data = match kind {
                    TaskKind::Advice => TaskData::Advice(AdviceBatch::fallback(pair)),
                    _ => TaskData::Series(PlayerBatch::fallback(pair)),
                };
                TaskOutcome {
                    kind,
                    data,
                    error: Some(message),
                }
            }
        }
    }

    /// generate → recover → validate against the task's schema
    async fn execute_task(
        &self,
        kind: TaskKind,
        asset: &RemoteAsset,
        pair: &[String; 2],
    ) -> Result<TaskData, String> {
        let raw = self
            .media
            .generate(asset, &kind.prompt(pair))
            .await
            .map_err(|e| format!("generation failed: {}", e))?;

        let value = recovery_parser::recover(&raw).map_err(|e| format!("response unusable: {}", e))?;

        match kind {
            TaskKind::Advice => serde_json::from_value::<AdviceBatch>(value).map(TaskData::Advice),
            _ => serde_json::from_value::<PlayerBatch>(value).map(TaskData::Series),
        }
        .map_err(|e| format!("schema mismatch: {}", e))
    }

    /// Reconcile names across all settled tasks and build the aggregate
    fn assemble(&self, bundle: ExtractionBundle, started: Instant) -> MatchAnalysis {
        let ExtractionBundle {
            narrative,
            narrative_error,
            pair,
            outcomes,
        } = bundle;

        let mut errors = TaskErrors {
            narrative: narrative_error,
            ..TaskErrors::default()
        };
        let mut score = None;
        let mut punch = None;
        let mut kick = None;
        let mut violation = None;
        let mut advice = None;

        for outcome in outcomes {
            match (outcome.kind, outcome.data) {
                (TaskKind::Score, TaskData::Series(mut batch)) => {
                    name_reconciler::align_series(&mut batch.players, &pair);
                    score = Some(batch);
                    errors.score = outcome.error;
                }
                (TaskKind::Punch, TaskData::Series(mut batch)) => {
                    name_reconciler::align_series(&mut batch.players, &pair);
                    punch = Some(batch);
                    errors.punch = outcome.error;
                }
                (TaskKind::Kick, TaskData::Series(mut batch)) => {
                    name_reconciler::align_series(&mut batch.players, &pair);
                    kick = Some(batch);
                    errors.kick = outcome.error;
                }
                (TaskKind::Violation, TaskData::Series(mut batch)) => {
                    name_reconciler::align_series(&mut batch.players, &pair);
                    violation = Some(batch);
                    errors.violation = outcome.error;
                }
                (TaskKind::Advice, TaskData::Advice(mut batch)) => {
                    name_reconciler::align_advice(&mut batch.players, &pair);
                    advice = Some(batch);
                    errors.advice = outcome.error;
                }
                (kind, _) => {
                    tracing::error!(task = kind.name(), "Task produced data of the wrong shape");
                }
            }
        }

        MatchAnalysis {
            match_analysis: narrative,
            score_analysis: score.unwrap_or_else(|| PlayerBatch::fallback(&pair)),
            punch_analysis: punch.unwrap_or_else(|| PlayerBatch::fallback(&pair)),
            kick_count_analysis: kick.unwrap_or_else(|| PlayerBatch::fallback(&pair)),
            yellow_card_analysis: violation.unwrap_or_else(|| PlayerBatch::fallback(&pair)),
            advice_analysis: advice.unwrap_or_else(|| AdviceBatch::fallback(&pair)),
            sport: self.sport.clone(),
            processed_at: Utc::now().to_rfc3339(),
            processing_time_ms: started.elapsed().as_millis() as u64,
            errors,
        }
    }

    /// Progress write plus lossy event broadcast
    fn report(&self, job_id: &str, stage: &str, progress: u8) {
        self.progress.update(job_id, stage, progress);
        self.event_bus.emit_lossy(AnalysisEvent::AnalysisProgress {
            job_id: job_id.to_string(),
            stage: stage.to_string(),
            progress,
            timestamp: Utc::now(),
        });
    }
}
