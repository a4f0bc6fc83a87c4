//! Topic ingest and the two client-facing streaming endpoints.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, StreamExt, stream};
use serde::Serialize;
use tracing::warn;

use crate::AppState;
use crate::relay::EventEnvelope;
use crate::views;

/// Interval between `: ping` comment frames on every SSE connection.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(25);

/// Topic handler: receives CloudEvents published on the beacon channel.
///
/// The body is parsed leniently — a malformed payload degrades to an empty
/// envelope and is normalized like any other. The producer always sees 200
/// with no body; nothing here is surfaced back as an error.
pub async fn ingest_event(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let envelope = serde_json::from_slice::<EventEnvelope>(&body).unwrap_or_default();
    state.relay.ingest(envelope);
    StatusCode::OK
}

/// Subscription discovery endpoint: advertises the one static topic binding.
pub async fn dapr_subscribe(State(state): State<AppState>) -> impl IntoResponse {
    #[derive(Serialize)]
    struct TopicBinding<'a> {
        pubsubname: &'a str,
        topic: &'a str,
        route: &'a str,
    }

    Json(vec![TopicBinding {
        pubsubname: &state.config.pubsub_name,
        topic: &state.config.topic,
        route: &state.config.topic,
    }])
    .into_response()
}

/// Raw event stream: one `data:` frame per normalized event, JSON-encoded.
/// Opens with a `: connected` comment; no backlog is replayed.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let frames = state.relay.subscribe().filter_map(|event| async move {
        match serde_json::to_string(&event) {
            Ok(payload) => Some(Ok(Event::default().data(payload))),
            Err(error) => {
                warn!(%error, "dropping unencodable event frame");
                None
            }
        }
    });

    sse_response(frames)
}

/// Rendered projection of the event stream for the transcript page: each
/// frame carries a server-rendered chat block plus its classification, so the
/// browser shim only appends markup.
pub async fn transcript_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let frames = state.relay.subscribe().filter_map(|event| async move {
        let frame = views::transcript_frame(&event);
        match serde_json::to_string(&frame) {
            Ok(payload) => Some(Ok(Event::default().data(payload))),
            Err(error) => {
                warn!(%error, "dropping unencodable transcript frame");
                None
            }
        }
    });

    sse_response(frames)
}

fn sse_response<S>(frames: S) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    let stream = stream::once(async { Ok(Event::default().comment("connected")) }).chain(frames);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEPALIVE_INTERVAL)
            .text("ping"),
    )
}
