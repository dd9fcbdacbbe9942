//! Log stream API Handler

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::{self, Stream};
use reel_core::dto::log::LogFrame;
use std::convert::Infallible;

use crate::api::AppState;

/// GET /api/logs
/// Server-Sent Events stream of progress lines
///
/// Each event carries one `{"log": "..."}` frame. When nothing arrives within
/// the poll timeout an empty frame is sent as a heartbeat. The stream only
/// ends when the client disconnects.
pub async fn stream_logs(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let bus = state.orchestrator.log_bus();
    let timeout = state.log_poll_timeout;

    let events = stream::unfold(bus, move |bus| async move {
        let frame = match bus.drain(timeout).await {
            Some(entry) => LogFrame::from(&entry),
            None => LogFrame::heartbeat(),
        };
        let event = Event::default()
            .json_data(&frame)
            .unwrap_or_else(|_| Event::default().data(r#"{"log":""}"#));
        Some((Ok(event), bus))
    });

    Sse::new(events)
}
