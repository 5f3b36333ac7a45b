//! Wire types for match analysis results
//!
//! Field names follow the shape consumed by the dashboard and the report
//! exporter; serde renames cover the camelCase portions.

use serde::{Deserialize, Serialize};

/// One timed event within a player's series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEvent {
    /// Match clock position, "MM:SS"
    pub timestamp: String,
    pub description: String,
    pub value: i64,
}

/// Per-player event series, shared by the score/punch/kick/violation tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeries {
    pub name: String,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub events: Vec<SeriesEvent>,
}

impl PlayerSeries {
    /// Zeroed series used when an extraction task fails
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total: 0,
            events: Vec::new(),
        }
    }
}

/// One advice category: observed issues plus suggested improvements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdviceSection {
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

/// Per-player coaching advice produced by the advice task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceRecord {
    pub name: String,
    #[serde(rename = "tacticalAdvice", default)]
    pub tactical_advice: AdviceSection,
    #[serde(rename = "technicalAdvice", default)]
    pub technical_advice: AdviceSection,
    #[serde(rename = "mentalAdvice", default)]
    pub mental_advice: AdviceSection,
}

impl AdviceRecord {
    /// Empty advice record used when the advice task fails
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tactical_advice: AdviceSection::default(),
            technical_advice: AdviceSection::default(),
            mental_advice: AdviceSection::default(),
        }
    }
}

/// Players wrapper for the four series-producing tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBatch {
    pub players: Vec<PlayerSeries>,
}

impl PlayerBatch {
    /// Fallback batch: two zeroed series carrying the canonical names
    pub fn fallback(names: &[String; 2]) -> Self {
        Self {
            players: vec![PlayerSeries::empty(&names[0]), PlayerSeries::empty(&names[1])],
        }
    }
}

/// Players wrapper for the advice task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceBatch {
    pub players: Vec<AdviceRecord>,
}

impl AdviceBatch {
    /// Fallback batch: two empty advice records carrying the canonical names
    pub fn fallback(names: &[String; 2]) -> Self {
        Self {
            players: vec![AdviceRecord::empty(&names[0]), AdviceRecord::empty(&names[1])],
        }
    }
}

/// Per-task error map; `None` entries mean the task fully succeeded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskErrors {
    #[serde(rename = "match")]
    pub narrative: Option<String>,
    pub score: Option<String>,
    pub punch: Option<String>,
    pub kick: Option<String>,
    pub violation: Option<String>,
    pub advice: Option<String>,
}

/// Full aggregate returned by the analysis pipeline
///
/// Invariant: every players collection holds exactly two entries, and
/// index 0/1 refer to the same two athletes across all collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    /// Free-text match narrative; `None` when the narrative task failed
    pub match_analysis: Option<String>,
    pub score_analysis: PlayerBatch,
    pub punch_analysis: PlayerBatch,
    pub kick_count_analysis: PlayerBatch,
    /// Canonical penalty field; `gam_jeom_analysis` is accepted on input
    /// as a legacy alias for backward compatibility.
    #[serde(alias = "gam_jeom_analysis")]
    pub yellow_card_analysis: PlayerBatch,
    pub advice_analysis: AdviceBatch,
    pub sport: String,
    /// ISO-8601 completion timestamp
    #[serde(rename = "processedAt")]
    pub processed_at: String,
    #[serde(rename = "processingTimeMs")]
    pub processing_time_ms: u64,
    pub errors: TaskErrors,
}
