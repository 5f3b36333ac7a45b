//! Pipeline services for msight-va

pub mod asset_manager;
pub mod media_client;
pub mod name_reconciler;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod recovery_parser;
pub mod results;

pub use asset_manager::AssetManager;
pub use media_client::{AssetState, GeminiClient, MediaError, MediaService, RemoteAsset};
pub use orchestrator::AnalysisOrchestrator;
pub use progress::{JobProgress, ProgressRegistry};
pub use results::ResultStore;
