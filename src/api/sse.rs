//! Server-Sent Events for a streaming turn

use crate::conversation::{Display, DisplayItem};
use crate::orchestrator::TurnUpdate;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::StreamExt;

/// Events sent to the browser during one turn
#[derive(Debug, Clone)]
pub enum SseEvent {
    User { item: DisplayItem },
    Provisional { display: Display },
    Final { item: DisplayItem },
    Error { message: String },
}

impl From<TurnUpdate> for SseEvent {
    fn from(update: TurnUpdate) -> Self {
        match update {
            TurnUpdate::User(item) => SseEvent::User { item },
            TurnUpdate::Provisional(display) => SseEvent::Provisional { display },
        }
    }
}

/// Wrap a stream of turn events as an SSE response
pub fn sse_stream(
    events: impl Stream<Item = SseEvent> + Send + 'static,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = events.map(|event| Ok(sse_event_to_axum(event)));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn sse_event_to_axum(event: SseEvent) -> Event {
    let (event_type, data) = match event {
        SseEvent::User { item } => (
            "user",
            json!({
                "type": "user",
                "item": item
            }),
        ),
        SseEvent::Provisional { display } => (
            "provisional",
            json!({
                "type": "provisional",
                "display": display
            }),
        ),
        SseEvent::Final { item } => (
            "final",
            json!({
                "type": "final",
                "item": item
            }),
        ),
        SseEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
