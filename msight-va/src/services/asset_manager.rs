//! Media asset lifecycle management
//!
//! Owns one remote asset for the duration of an analysis run:
//! upload, poll until ready (or failed/timed out), hand the asset to the
//! caller's work closure, and delete the remote copy on every exit path.
//! Callers cannot reach the asset except through [`AssetManager::with_ready_asset`],
//! so cleanup cannot be forgotten.

use crate::error::PipelineError;
use crate::services::media_client::{AssetState, MediaService, RemoteAsset};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_PROCESSING_TIMEOUT: Duration = Duration::from_secs(600);

/// Scoped acquisition of a remote media asset
pub struct AssetManager {
    media: Arc<dyn MediaService>,
    poll_interval: Duration,
    processing_timeout: Duration,
}

impl AssetManager {
    pub fn new(
        media: Arc<dyn MediaService>,
        poll_interval: Duration,
        processing_timeout: Duration,
    ) -> Self {
        Self {
            media,
            poll_interval,
            processing_timeout,
        }
    }

    /// Upload `path`, wait until the asset is ready, run `work`, and
    /// delete the remote copy regardless of outcome.
    ///
    /// `on_progress` fires at each lifecycle transition
    /// (uploading → processing → ready). Upload failures and
    /// processing failures/timeouts are fatal; the delete still runs for
    /// everything acquired. Delete failures are logged and swallowed so
    /// cleanup can never mask the primary outcome.
    pub async fn with_ready_asset<T, F, Fut>(
        &self,
        path: &Path,
        mime_type: &str,
        mut on_progress: impl FnMut(AssetState),
        work: F,
    ) -> Result<T, PipelineError>
    where
        F: FnOnce(RemoteAsset) -> Fut,
        Fut: Future<Output = Result<T, PipelineError>>,
    {
        on_progress(AssetState::Uploading);

        let asset = self
            .media
            .upload(path, mime_type)
            .await
            .map_err(|e| PipelineError::UploadFailed(e.to_string()))?;

        on_progress(AssetState::Processing);

        let outcome = async {
            self.wait_until_ready(&asset).await?;
            on_progress(AssetState::Ready);
            work(asset.clone()).await
        }
        .await;

        self.release(&asset).await;
        outcome
    }

    /// Poll the remote state until ready, failed, or the budget elapses
    async fn wait_until_ready(&self, asset: &RemoteAsset) -> Result<(), PipelineError> {
        let deadline = Instant::now() + self.processing_timeout;

        loop {
            match self.media.get_state(asset).await {
                Ok(AssetState::Ready) => {
                    tracing::info!(asset_id = %asset.id, "Remote asset ready");
                    return Ok(());
                }
                Ok(AssetState::Failed) => {
                    return Err(PipelineError::ProcessingFailed(format!(
                        "remote processing failed for asset {}",
                        asset.id
                    )));
                }
                Ok(_) => {
                    tracing::debug!(asset_id = %asset.id, "Remote asset still processing");
                }
                Err(e) => {
                    // Transient poll failures are retried until the deadline
                    tracing::warn!(asset_id = %asset.id, error = %e, "Asset state poll failed");
                }
            }

            if Instant::now() >= deadline {
                return Err(PipelineError::ProcessingTimeout {
                    budget: self.processing_timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Best-effort remote delete
    async fn release(&self, asset: &RemoteAsset) {
        match self.media.delete(asset).await {
            Ok(()) => tracing::debug!(asset_id = %asset.id, "Remote asset released"),
            Err(e) => {
                tracing::warn!(asset_id = %asset.id, error = %e, "Remote asset delete failed")
            }
        }
    }
}
