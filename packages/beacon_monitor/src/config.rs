use std::env;

/// Default listen port when `DAPR_APP_PORT` is unset.
const DEFAULT_PORT: u16 = 5200;
const DEFAULT_PUBSUB_NAME: &str = "pubsub";
const DEFAULT_TOPIC: &str = "beacon_channel";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration, read from the sidecar environment.
///
/// The monitor is configured the way every service in the mesh is: through
/// `DAPR_*` environment variables injected next to the app. Unset or
/// unparseable values fall back to defaults rather than failing startup.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Listen port (`DAPR_APP_PORT`).
    pub port: u16,
    /// Pub/sub component binding name (`DAPR_PUBSUB_NAME`).
    pub pubsub_name: String,
    /// Topic this monitor subscribes to (`DAPR_BROADCAST_TOPIC`).
    pub topic: String,
    /// Default tracing level (`DAPR_LOG_LEVEL`), overridable via `RUST_LOG`.
    pub log_level: String,
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_port(env::var("DAPR_APP_PORT").ok(), DEFAULT_PORT),
            pubsub_name: string_or(env::var("DAPR_PUBSUB_NAME").ok(), DEFAULT_PUBSUB_NAME),
            topic: string_or(env::var("DAPR_BROADCAST_TOPIC").ok(), DEFAULT_TOPIC),
            log_level: string_or(env::var("DAPR_LOG_LEVEL").ok(), DEFAULT_LOG_LEVEL),
        }
    }

    /// Route the topic handler is mounted on; matches the `route` field the
    /// subscription discovery endpoint advertises.
    pub fn topic_route(&self) -> String {
        format!("/{}", self.topic)
    }
}

fn parse_port(raw: Option<String>, default: u16) -> u16 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(default)
}

fn string_or(raw: Option<String>, default: &str) -> String {
    raw.filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}
