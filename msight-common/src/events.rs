//! Event types for the MatchSight event system

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// MatchSight event types
///
/// Broadcast by the analysis pipeline and forwarded to SSE subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisEvent {
    /// Analysis job accepted and started
    AnalysisStarted {
        job_id: String,
        video_path: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Progress update during pipeline progression
    AnalysisProgress {
        job_id: String,
        stage: String,
        progress: u8,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis completed; result available under `analysis_id`
    AnalysisCompleted {
        job_id: String,
        analysis_id: i64,
        duration_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis aborted by a fatal pipeline failure
    AnalysisFailed {
        job_id: String,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl AnalysisEvent {
    /// Event type name used as the SSE event tag
    pub fn event_type(&self) -> &'static str {
        match self {
            AnalysisEvent::AnalysisStarted { .. } => "AnalysisStarted",
            AnalysisEvent::AnalysisProgress { .. } => "AnalysisProgress",
            AnalysisEvent::AnalysisCompleted { .. } => "AnalysisCompleted",
            AnalysisEvent::AnalysisFailed { .. } => "AnalysisFailed",
        }
    }
}

/// Broadcast bus for analysis events
///
/// Thin wrapper over `tokio::sync::broadcast`; slow subscribers drop
/// events rather than back-pressuring the pipeline.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AnalysisEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring the no-subscriber case
    ///
    /// Progress updates are fire-and-forget; it is not an error for
    /// nobody to be listening.
    pub fn emit_lossy(&self, event: AnalysisEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
