//! Shared test support: a scriptable in-memory media service
#![allow(dead_code)]

use async_trait::async_trait;
use msight_va::services::{AssetState, MediaError, MediaService, RemoteAsset};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Distinctive prompt substrings, one per task (see services::prompts)
pub const NARRATIVE_MARKER: &str = "full match narrative";
pub const SCORE_MARKER: &str = "point-scoring timeline";
pub const PUNCH_MARKER: &str = "punch timeline";
pub const KICK_MARKER: &str = "kick timeline";
pub const VIOLATION_MARKER: &str = "penalty timeline";
pub const ADVICE_MARKER: &str = "coaching advice";

/// Scriptable implementation of the four-operation media contract
///
/// Generation responses are keyed by a marker substring of the prompt;
/// the remote state sequence is consumed one entry per poll, with the
/// last entry repeating forever.
pub struct MockMediaService {
    responses: Mutex<Vec<(String, Result<String, String>)>>,
    states: Mutex<VecDeque<AssetState>>,
    fail_upload: bool,
    pub uploads: AtomicUsize,
    pub deletes: AtomicUsize,
    pub state_polls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl MockMediaService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            states: Mutex::new(VecDeque::from([AssetState::Ready])),
            fail_upload: false,
            uploads: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            state_polls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Script the remote state sequence observed by polls
    pub fn with_states(self, states: &[AssetState]) -> Self {
        *self.states.lock().unwrap() = states.iter().copied().collect();
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    /// Respond to prompts containing `marker` with `body`
    pub fn respond(self, marker: &str, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((marker.to_string(), Ok(body.to_string())));
        self
    }

    /// Fail prompts containing `marker`
    pub fn respond_err(self, marker: &str, error: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((marker.to_string(), Err(error.to_string())));
        self
    }
}

impl Default for MockMediaService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaService for MockMediaService {
    async fn upload(&self, _path: &Path, mime_type: &str) -> Result<RemoteAsset, MediaError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_upload {
            return Err(MediaError::Api(503, "upload rejected".to_string()));
        }
        Ok(RemoteAsset {
            id: "files/test-asset".to_string(),
            uri: "mock://files/test-asset".to_string(),
            mime_type: mime_type.to_string(),
        })
    }

    async fn get_state(&self, _asset: &RemoteAsset) -> Result<AssetState, MediaError> {
        self.state_polls.fetch_add(1, Ordering::SeqCst);
        let mut states = self.states.lock().unwrap();
        let state = if states.len() > 1 {
            states.pop_front().unwrap()
        } else {
            *states.front().unwrap_or(&AssetState::Ready)
        };
        Ok(state)
    }

    async fn delete(&self, _asset: &RemoteAsset) -> Result<(), MediaError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn generate(&self, _asset: &RemoteAsset, prompt: &str) -> Result<String, MediaError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let responses = self.responses.lock().unwrap();
        for (marker, response) in responses.iter() {
            if prompt.contains(marker) {
                return response
                    .clone()
                    .map_err(|msg| MediaError::Api(500, msg));
            }
        }
        Err(MediaError::EmptyResponse)
    }
}

/// Valid series payload for the four series-producing tasks
pub fn series_json(name1: &str, total1: i64, name2: &str, total2: i64) -> String {
    serde_json::json!({
        "players": [
            {"name": name1, "total": total1, "events": []},
            {"name": name2, "total": total2, "events": []}
        ]
    })
    .to_string()
}

/// Valid advice payload
pub fn advice_json(name1: &str, name2: &str) -> String {
    serde_json::json!({
        "players": [
            {
                "name": name1,
                "tacticalAdvice": {"issues": ["drops guard"], "improvements": ["feint more"]},
                "technicalAdvice": {"issues": [], "improvements": []},
                "mentalAdvice": {"issues": [], "improvements": []}
            },
            {
                "name": name2,
                "tacticalAdvice": {"issues": [], "improvements": []},
                "technicalAdvice": {"issues": [], "improvements": []},
                "mentalAdvice": {"issues": [], "improvements": []}
            }
        ]
    })
    .to_string()
}

/// A narrative that names both finalists the way broadcast graphics do
pub fn sample_narrative() -> String {
    "Seif Eissa (EGY) faced Vito Dell'Aquila (ITA) in a tense final. \
     Seif Eissa (EGY) pressed forward early, but Vito Dell'Aquila (ITA) \
     countered with fast lead-leg kicks and controlled the distance to the end."
        .to_string()
}

/// Mock scripted with a complete, well-formed set of responses
pub fn fully_scripted_mock() -> MockMediaService {
    MockMediaService::new()
        .respond(NARRATIVE_MARKER, &sample_narrative())
        .respond(
            SCORE_MARKER,
            &series_json("Seif Eissa (EGY)", 5, "Vito Dell'Aquila (ITA)", 3),
        )
        .respond(
            PUNCH_MARKER,
            &series_json("Seif Eissa (EGY)", 2, "Vito Dell'Aquila (ITA)", 4),
        )
        .respond(
            KICK_MARKER,
            &series_json("Seif Eissa (EGY)", 11, "Vito Dell'Aquila (ITA)", 9),
        )
        .respond(
            VIOLATION_MARKER,
            &series_json("Seif Eissa (EGY)", 1, "Vito Dell'Aquila (ITA)", 0),
        )
        .respond(
            ADVICE_MARKER,
            &advice_json("Seif Eissa (EGY)", "Vito Dell'Aquila (ITA)"),
        )
}
