//! # MatchSight Common Library
//!
//! Shared code for MatchSight microservices including:
//! - Event types (AnalysisEvent enum) and the broadcast EventBus
//! - SSE stream helpers
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
