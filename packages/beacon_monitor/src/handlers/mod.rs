mod events;
mod health;

pub use events::{dapr_subscribe, event_stream, ingest_event, transcript_stream};
pub use health::{health_handler, health_live_handler};
