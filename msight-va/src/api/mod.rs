//! HTTP API handlers for msight-va

pub mod analysis;
pub mod health;

pub use analysis::analysis_routes;
pub use health::health_routes;

use crate::AppState;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - heartbeat-only stream for connection status monitoring
pub async fn event_stream(
    State(_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    msight_common::sse::create_heartbeat_sse_stream("msight-va")
}
