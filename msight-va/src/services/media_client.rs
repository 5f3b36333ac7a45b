//! External media-understanding service client
//!
//! The pipeline depends on a four-operation contract: upload a local
//! file, poll the remote processing state, generate text against the
//! processed asset, and delete the remote copy. [`MediaService`] is that
//! contract; [`GeminiClient`] is the production implementation speaking
//! the Google Generative Language files API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Media service client errors
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Remote handle for an uploaded media asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAsset {
    /// Opaque resource identifier (e.g. "files/abc123")
    pub id: String,
    /// Download/reference URI used in generation requests
    pub uri: String,
    pub mime_type: String,
}

/// Remote asset lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    Uploading,
    Processing,
    Ready,
    Failed,
}

/// Four-operation contract with the external media-understanding service
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Upload a local file, returning the remote handle
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<RemoteAsset, MediaError>;

    /// Current remote processing state of an uploaded asset
    async fn get_state(&self, asset: &RemoteAsset) -> Result<AssetState, MediaError>;

    /// Delete the remote copy of an asset
    async fn delete(&self, asset: &RemoteAsset) -> Result<(), MediaError>;

    /// Run one generation request against a processed asset
    ///
    /// The response is free text; callers that expect structured data
    /// must pass it through the recovery parser.
    async fn generate(&self, asset: &RemoteAsset, prompt: &str) -> Result<String, MediaError>;
}

// ---------------------------------------------------------------------------
// Wire types for the files API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileResource,
}

#[derive(Debug, Deserialize)]
struct FileResource {
    name: String,
    uri: String,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
struct FileData {
    #[serde(rename = "fileUri")]
    file_uri: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// Production client
// ---------------------------------------------------------------------------

/// Gemini files-API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self, MediaError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MediaError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    fn map_state(state: Option<&str>) -> AssetState {
        match state {
            Some("ACTIVE") => AssetState::Ready,
            Some("FAILED") => AssetState::Failed,
            Some("PROCESSING") | None => AssetState::Processing,
            Some(other) => {
                tracing::warn!(state = other, "Unknown remote asset state, treating as processing");
                AssetState::Processing
            }
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, MediaError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Api(status.as_u16(), body));
        }
        Ok(response)
    }
}

#[async_trait]
impl MediaService for GeminiClient {
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<RemoteAsset, MediaError> {
        let bytes = tokio::fs::read(path).await?;
        let url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);

        tracing::debug!(
            path = %path.display(),
            size_bytes = bytes.len(),
            "Uploading video to media service"
        );

        let response = self
            .http_client
            .post(&url)
            .header("X-Goog-Upload-Protocol", "raw")
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(e.to_string()))?;

        tracing::info!(asset_id = %upload.file.name, "Video uploaded");

        Ok(RemoteAsset {
            id: upload.file.name,
            uri: upload.file.uri,
            mime_type: upload.file.mime_type.unwrap_or_else(|| mime_type.to_string()),
        })
    }

    async fn get_state(&self, asset: &RemoteAsset) -> Result<AssetState, MediaError> {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, asset.id, self.api_key);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let file: FileResource = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(e.to_string()))?;

        Ok(Self::map_state(file.state.as_deref()))
    }

    async fn delete(&self, asset: &RemoteAsset) -> Result<(), MediaError> {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, asset.id, self.api_key);

        let response = self
            .http_client
            .delete(&url)
            .send()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;

        Self::check_status(response).await?;
        tracing::debug!(asset_id = %asset.id, "Remote asset deleted");
        Ok(())
    }

    async fn generate(&self, asset: &RemoteAsset, prompt: &str) -> Result<String, MediaError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::File {
                        file_data: FileData {
                            file_uri: asset.uri.clone(),
                            mime_type: asset.mime_type.clone(),
                        },
                    },
                    Part::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(e.to_string()))?;

        let text: String = generated
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(MediaError::EmptyResponse);
        }
        Ok(text)
    }
}
