//! Event normalization and fan-out entry point.
//!
//! Producers are loosely-typed upstream services: some publish a structured
//! `data` object, some a JSON-encoded string, some nothing at all. The relay
//! absorbs all of it — ingest never fails observably, malformed payloads
//! degrade to the best available field.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::registry::{SubscriberRegistry, Subscription};

const UNKNOWN_SOURCE: &str = "unknown";

/// Inbound CloudEvents-shaped wrapper as delivered by the pub/sub sidecar.
/// Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Canonical internal event shape after the extraction policy has run.
///
/// `content` is either a string or a structured value, never JSON `null` at
/// the top level: the fallback chain bottoms out at `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub time: String,
    pub source: String,
    pub content: Value,
}

impl NormalizedEvent {
    pub fn from_envelope(envelope: EventEnvelope) -> Self {
        Self {
            time: envelope.time.unwrap_or_else(|| Utc::now().to_rfc3339()),
            source: envelope
                .source
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            content: extract_content(envelope.data),
        }
    }
}

/// Content extraction policy: `data.content`, else `data.message`, else
/// `data.text`, else `data` itself; a string `data` gets one JSON re-parse
/// attempt first (parse failure keeps the string unchanged).
fn extract_content(data: Option<Value>) -> Value {
    let Some(mut data) = data else {
        return empty_object();
    };

    if let Value::String(raw) = &data {
        if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
            data = parsed;
        }
    }

    match data {
        Value::Object(map) => pick_field(map),
        Value::Array(items) => Value::Array(items),
        Value::String(text) => Value::String(text),
        // Bare scalars carry nothing displayable; degrade like absent data.
        Value::Number(_) | Value::Bool(_) | Value::Null => empty_object(),
    }
}

fn pick_field(map: Map<String, Value>) -> Value {
    for key in ["content", "message", "text"] {
        if let Some(value) = map.get(key) {
            // An explicit null field counts as absent, like the next-field
            // fallback producers rely on.
            if !value.is_null() {
                return value.clone();
            }
        }
    }
    Value::Object(map)
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Accepts inbound envelopes and drives the subscriber registry.
pub struct EventRelay {
    registry: Arc<SubscriberRegistry>,
}

impl EventRelay {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(SubscriberRegistry::new()),
        }
    }

    /// Normalizes one envelope and fans it out to every live subscriber.
    /// Infallible from the caller's perspective.
    pub fn ingest(&self, envelope: EventEnvelope) {
        let event = NormalizedEvent::from_envelope(envelope);
        let preview = match &event.content {
            Value::String(text) => text.clone(),
            structured => structured.to_string(),
        };
        info!(source = %event.source, content = %preview, "beacon event");
        self.registry.broadcast(&event);
    }

    /// Opens a new subscription on the client-facing stream.
    pub fn subscribe(&self) -> Subscription {
        self.registry.register()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new()
    }
}
